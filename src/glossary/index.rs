//! Per-script term index over the glossary dictionary.
//!
//! The index is built wholesale from dictionary rows and never mutated
//! afterwards; reload replaces the whole structure behind a fresh `Arc`.

use std::collections::HashMap;
use std::path::Path;
use tracing::{info, warn};

use crate::error::Result;
use crate::glossary::loader::{self, DictRow};
use crate::glossary::normalize::normalize_key;
use crate::lang::{Script, detect_script};

/// One glossary entry. The script is inferred once from the display term.
#[derive(Debug, Clone)]
pub struct GlossaryEntry {
    pub term: String,
    pub definition: String,
    pub script: Script,
    /// Normalized form of `term`, precomputed for the substring pass.
    pub key: String,
}

/// Mapping of script -> normalized key -> entry identifiers.
#[derive(Debug, Default)]
pub struct TermIndex {
    entries: Vec<GlossaryEntry>,
    by_script: HashMap<Script, HashMap<String, Vec<usize>>>,
}

impl TermIndex {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build the index from dictionary rows. Rows with an empty term are
    /// skipped; everything else is classified by the dominant script of its
    /// term and inserted under its normalized key.
    pub fn build(rows: Vec<DictRow>) -> Self {
        let mut index = Self::default();
        for row in rows {
            if row.term.trim().is_empty() {
                continue;
            }
            let script = detect_script(&row.term);
            let key = normalize_key(&row.term);
            if key.is_empty() {
                continue;
            }
            let id = index.entries.len();
            index.entries.push(GlossaryEntry {
                term: row.term,
                definition: row.definition,
                script,
                key: key.clone(),
            });
            index
                .by_script
                .entry(script)
                .or_default()
                .entry(key)
                .or_default()
                .push(id);
        }
        index
    }

    /// Load and build from a dictionary file.
    pub async fn from_file<P: AsRef<Path>>(
        path: P,
        term_column: &str,
        definition_column: &str,
        encoding: &str,
    ) -> Result<Self> {
        let rows = loader::load_rows(path, term_column, definition_column, encoding).await?;
        let index = Self::build(rows);
        info!("Glossary index built with {} entries", index.len());
        Ok(index)
    }

    /// Load from a dictionary file, degrading to an empty index when the file
    /// is missing or unreadable. The service keeps serving with zero matches.
    pub async fn from_file_or_empty<P: AsRef<Path>>(
        path: P,
        term_column: &str,
        definition_column: &str,
        encoding: &str,
    ) -> Self {
        match Self::from_file(&path, term_column, definition_column, encoding).await {
            Ok(index) => index,
            Err(e) => {
                warn!(
                    "Failed to load glossary dictionary {}: {}; continuing with empty index",
                    path.as_ref().display(),
                    e
                );
                Self::empty()
            }
        }
    }

    /// Entry identifiers stored under an exact normalized key.
    pub fn lookup(&self, script: Script, key: &str) -> &[usize] {
        self.by_script
            .get(&script)
            .and_then(|partition| partition.get(key))
            .map(|ids| ids.as_slice())
            .unwrap_or(&[])
    }

    pub fn entry(&self, id: usize) -> &GlossaryEntry {
        &self.entries[id]
    }

    /// All entries with their identifiers, in dictionary order.
    pub fn entries(&self) -> impl Iterator<Item = (usize, &GlossaryEntry)> {
        self.entries.iter().enumerate()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
