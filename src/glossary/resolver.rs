//! Glossary resolution: match free-form subtitle text against the term index
//! and render hits in the viewer's display language.
//!
//! Matching is strictly same-script. Cross-script needs are served by
//! translating what is *displayed*, never by relaxing the index lookup.

use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

use crate::glossary::index::TermIndex;
use crate::glossary::normalize::{candidate_keys, normalize_key};
use crate::lang::{Script, canonicalize_code, detect_script};
use crate::translate::TranslationService;

/// One resolved glossary annotation, ready for display.
#[derive(Debug, Clone, Serialize)]
pub struct GlossaryHit {
    /// Term in the requested display language.
    pub term: String,
    /// Term as it appears in the dictionary.
    pub term_original: String,
    /// Definition in the requested display language.
    pub definition: String,
    /// Script of the underlying dictionary entry.
    pub script: Script,
}

pub struct GlossaryResolver {
    index: Arc<TermIndex>,
    translator: Arc<TranslationService>,
    result_limit: usize,
}

impl GlossaryResolver {
    pub fn new(index: Arc<TermIndex>, translator: Arc<TranslationService>, result_limit: usize) -> Self {
        Self {
            index,
            translator,
            result_limit,
        }
    }

    /// Resolve glossary entries for one piece of subtitle text.
    ///
    /// `match_lang` is the language of the text itself (detected when absent);
    /// `display_lang` is the language the viewer is reading. Empty input, an
    /// empty index or no matches all yield an empty list, never an error.
    pub async fn explain(
        &self,
        text: &str,
        display_lang: &str,
        match_lang: Option<&str>,
    ) -> Vec<GlossaryHit> {
        if text.trim().is_empty() || self.index.is_empty() {
            return Vec::new();
        }

        let display_lang = canonicalize_code(display_lang);
        let script = match match_lang {
            Some(code) => {
                Script::from_code(&canonicalize_code(code)).unwrap_or(Script::Other)
            }
            None => detect_script(text),
        };

        let mut ids = self.exact_pass(text, script);
        if ids.is_empty() {
            ids = self.substring_pass(text, script);
        }
        debug!("Glossary matched {} entries for script {}", ids.len(), script);

        self.render(&ids, &display_lang).await
    }

    /// Exact pass: candidate keys in generation order against the same-script
    /// index partition.
    fn exact_pass(&self, text: &str, script: Script) -> Vec<usize> {
        let mut ids = Vec::new();
        let mut seen = HashSet::new();

        'keys: for key in candidate_keys(text) {
            for &id in self.index.lookup(script, &key) {
                if seen.insert(id) {
                    ids.push(id);
                    if ids.len() >= self.result_limit {
                        break 'keys;
                    }
                }
            }
        }
        ids
    }

    /// Fallback pass: every same-script entry whose normalized term is a
    /// substring of the normalized input, in dictionary order. Linear in the
    /// dictionary, so only taken when the exact pass found nothing.
    fn substring_pass(&self, text: &str, script: Script) -> Vec<usize> {
        let haystack = normalize_key(text);
        if haystack.is_empty() {
            return Vec::new();
        }

        let mut ids = Vec::new();
        for (id, entry) in self.index.entries() {
            if entry.script != script || entry.key.is_empty() {
                continue;
            }
            if haystack.contains(&entry.key) {
                ids.push(id);
                if ids.len() >= self.result_limit {
                    break;
                }
            }
        }
        ids
    }

    /// Render matched entries in the display language, de-duplicated by
    /// normalized display term. Translation failure degrades per entry to the
    /// original-script strings (the chain's identity fallback guarantees it).
    async fn render(&self, ids: &[usize], display_lang: &str) -> Vec<GlossaryHit> {
        let mut hits = Vec::new();
        let mut seen_terms = HashSet::new();

        for &id in ids {
            let entry = self.index.entry(id);
            let (term, definition) = if display_lang == entry.script.code() {
                (entry.term.clone(), entry.definition.clone())
            } else {
                let batch = vec![entry.term.clone(), entry.definition.clone()];
                let mut translated = self
                    .translator
                    .translate(&batch, entry.script.code(), display_lang)
                    .await;
                let definition = translated.pop().unwrap_or_default();
                let term = translated.pop().unwrap_or_default();
                (term, definition)
            };

            if !seen_terms.insert(normalize_key(&term)) {
                continue;
            }
            hits.push(GlossaryHit {
                term,
                term_original: entry.term.clone(),
                definition,
                script: entry.script,
            });
        }

        hits
    }
}
