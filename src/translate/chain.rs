//! Ordered translation backend chain with memoization.
//!
//! Stages are tried in order for the whole batch: direct model pair, pivot
//! through English, multilingual fallback, identity. The identity stage makes
//! `translate` infallible; subtitle output must exist even when every model
//! is down.

use std::sync::Arc;
use tracing::{debug, warn};

use crate::config::TranslateConfig;
use crate::error::Result;
use crate::lang::canonicalize_code;
use crate::translate::backend::{MultilingualBackend, PairBackend, TranslateBackend};
use crate::translate::cache::TranslationCache;
use crate::translate::chunk::chunk_text;

pub struct TranslationService {
    direct: Box<dyn TranslateBackend>,
    multilingual: Box<dyn TranslateBackend>,
    cache: Arc<TranslationCache>,
    max_chunk_chars: usize,
}

impl TranslationService {
    pub fn new(
        direct: Box<dyn TranslateBackend>,
        multilingual: Box<dyn TranslateBackend>,
        cache: Arc<TranslationCache>,
        max_chunk_chars: usize,
    ) -> Self {
        Self {
            direct,
            multilingual,
            cache,
            max_chunk_chars,
        }
    }

    pub fn from_config(config: &TranslateConfig, cache: Arc<TranslationCache>) -> Self {
        Self::new(
            Box::new(PairBackend::new(config)),
            Box::new(MultilingualBackend::new(config)),
            cache,
            config.max_chunk_chars,
        )
    }

    /// Translate a batch, preserving length and order. Never fails: when all
    /// backends are exhausted the original texts are returned unchanged.
    pub async fn translate(&self, texts: &[String], src: &str, tgt: &str) -> Vec<String> {
        let src = canonicalize_code(src);
        let tgt = canonicalize_code(tgt);

        if texts.is_empty() || src == tgt {
            return texts.to_vec();
        }

        // 1. Direct model pair.
        if self.direct.supports(&src, &tgt) {
            match self.run_stage(&*self.direct, texts, &src, &tgt).await {
                Ok(out) => return out,
                Err(e) => warn!("Direct translation {}->{} failed: {}", src, tgt, e),
            }
        }

        // 2. Pivot through English for non-English pairs.
        if src != "en"
            && tgt != "en"
            && self.direct.supports(&src, "en")
            && self.direct.supports("en", &tgt)
        {
            match self.pivot(texts, &src, &tgt).await {
                Ok(out) => return out,
                Err(e) => warn!("Pivot translation {}->en->{} failed: {}", src, tgt, e),
            }
        }

        // 3. Multilingual many-to-many model.
        if self.multilingual.supports(&src, &tgt) {
            match self.run_stage(&*self.multilingual, texts, &src, &tgt).await {
                Ok(out) => return out,
                Err(e) => warn!("Multilingual translation {}->{} failed: {}", src, tgt, e),
            }
        }

        // 4. Identity: translation failure degrades to the original text.
        warn!(
            "All translation backends exhausted for {}->{}; returning original text",
            src, tgt
        );
        texts.to_vec()
    }

    async fn pivot(&self, texts: &[String], src: &str, tgt: &str) -> Result<Vec<String>> {
        let mid = self.run_stage(&*self.direct, texts, src, "en").await?;
        self.run_stage(&*self.direct, &mid, "en", tgt).await
    }

    /// Run one backend stage over the batch, serving cached positions without
    /// a backend call and writing fresh translations back.
    async fn run_stage(
        &self,
        backend: &dyn TranslateBackend,
        texts: &[String],
        src: &str,
        tgt: &str,
    ) -> Result<Vec<String>> {
        let (mut slots, need_idx, need_texts) = self.cache.partition(backend.id(), src, tgt, texts);

        if need_idx.is_empty() {
            debug!("All {} texts served from cache ({})", texts.len(), backend.id());
        } else {
            let translated = self.translate_uncached(backend, &need_texts, src, tgt).await?;
            self.cache
                .fill(backend.id(), src, tgt, &need_idx, &need_texts, &translated, &mut slots);
        }

        Ok(slots.into_iter().map(|s| s.unwrap_or_default()).collect())
    }

    /// Translate cache misses, chunking long texts so bounded-input models
    /// never truncate. Empty texts are never sent to a backend.
    async fn translate_uncached(
        &self,
        backend: &dyn TranslateBackend,
        texts: &[String],
        src: &str,
        tgt: &str,
    ) -> Result<Vec<String>> {
        let mut flat = Vec::new();
        let mut spans = Vec::with_capacity(texts.len());

        for text in texts {
            if text.trim().is_empty() {
                spans.push((flat.len(), 0));
                continue;
            }
            let chunks = chunk_text(text, src, self.max_chunk_chars);
            spans.push((flat.len(), chunks.len()));
            flat.extend(chunks);
        }

        let translated = if flat.is_empty() {
            Vec::new()
        } else {
            backend.translate_batch(&flat, src, tgt).await?
        };

        Ok(spans
            .into_iter()
            .map(|(offset, len)| {
                if len == 0 {
                    String::new()
                } else {
                    translated[offset..offset + len].join(" ")
                }
            })
            .collect())
    }
}
