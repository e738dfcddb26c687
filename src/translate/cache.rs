//! Process-wide translation memo cache.
//!
//! Keys are `(backend_id, src_lang, tgt_lang, source_text)`; a key is only
//! present once its translation succeeded, and entries are never evicted for
//! the process lifetime. Concurrent writers racing on the same key write the
//! same value, which is benign.

use std::collections::HashMap;
use std::sync::RwLock;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    backend: String,
    src: String,
    tgt: String,
    text: String,
}

impl CacheKey {
    fn new(backend: &str, src: &str, tgt: &str, text: &str) -> Self {
        Self {
            backend: backend.to_string(),
            src: src.to_string(),
            tgt: tgt.to_string(),
            text: text.to_string(),
        }
    }
}

#[derive(Debug, Default)]
pub struct TranslationCache {
    map: RwLock<HashMap<CacheKey, String>>,
}

impl TranslationCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.map.read().expect("translation cache lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, backend: &str, src: &str, tgt: &str, text: &str) -> Option<String> {
        self.map
            .read()
            .expect("translation cache lock poisoned")
            .get(&CacheKey::new(backend, src, tgt, text))
            .cloned()
    }

    pub fn insert(&self, backend: &str, src: &str, tgt: &str, text: &str, translation: String) {
        self.map
            .write()
            .expect("translation cache lock poisoned")
            .insert(CacheKey::new(backend, src, tgt, text), translation);
    }

    /// Split a batch into cached hits and texts still needing translation.
    ///
    /// Returns per-position slots (hits filled, misses `None`), the positions
    /// of the misses and the miss texts in batch order.
    pub fn partition(
        &self,
        backend: &str,
        src: &str,
        tgt: &str,
        texts: &[String],
    ) -> (Vec<Option<String>>, Vec<usize>, Vec<String>) {
        let map = self.map.read().expect("translation cache lock poisoned");
        let mut slots = Vec::with_capacity(texts.len());
        let mut need_idx = Vec::new();
        let mut need_texts = Vec::new();

        for (i, text) in texts.iter().enumerate() {
            match map.get(&CacheKey::new(backend, src, tgt, text)) {
                Some(hit) => slots.push(Some(hit.clone())),
                None => {
                    slots.push(None);
                    need_idx.push(i);
                    need_texts.push(text.clone());
                }
            }
        }

        (slots, need_idx, need_texts)
    }

    /// Write freshly translated misses back and fill their slots.
    pub fn fill(
        &self,
        backend: &str,
        src: &str,
        tgt: &str,
        need_idx: &[usize],
        inputs: &[String],
        outputs: &[String],
        slots: &mut [Option<String>],
    ) {
        let mut map = self.map.write().expect("translation cache lock poisoned");
        for (j, &i) in need_idx.iter().enumerate() {
            map.insert(CacheKey::new(backend, src, tgt, &inputs[j]), outputs[j].clone());
            slots[i] = Some(outputs[j].clone());
        }
    }
}
