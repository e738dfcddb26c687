//! Key normalization and candidate-key generation for term matching.
//!
//! Index keys and lookup keys go through the same `normalize_key`, so exact
//! key equality is sufficient for an exact match.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

/// Word pattern: Latin alphanumeric runs (with inner dots/hyphens), digit
/// runs, and runs of Hangul, kana or CJK ideographs.
static WORD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[A-Za-z][A-Za-z0-9.\-]*|[0-9]+|\p{Hangul}+|[\p{Hiragana}\p{Katakana}]+|\p{Han}+")
        .expect("word pattern must compile")
});

/// Separator glyphs collapsed away alongside whitespace.
const SEPARATORS: &[char] = &[
    '/', '\\', '(', ')', '[', ']', '{', '}', '<', '>', '|', '·', '・', '‧',
];

/// Longest word-gram considered when generating candidate keys.
const MAX_GRAM: usize = 4;

/// Collapse text to a matching key: whitespace and separator glyphs removed,
/// lower-cased, hyphens/periods/commas stripped.
///
/// Total and idempotent; the empty string maps to itself.
pub fn normalize_key(text: &str) -> String {
    text.trim()
        .chars()
        .filter(|c| !c.is_whitespace() && !SEPARATORS.contains(c))
        .flat_map(|c| c.to_lowercase())
        .filter(|c| !matches!(c, '-' | '.' | ','))
        .collect()
}

/// Split text into matchable tokens.
pub fn tokenize(text: &str) -> Vec<&str> {
    WORD_RE.find_iter(text).map(|m| m.as_str()).collect()
}

/// Generate normalized lookup keys for every contiguous 1- to 4-token gram of
/// the input, single tokens first, left to right. Keys shorter than two
/// characters are dropped, as are duplicates.
pub fn candidate_keys(text: &str) -> Vec<String> {
    let tokens = tokenize(text);
    let mut keys = Vec::new();
    let mut seen = HashSet::new();

    for n in 1..=MAX_GRAM {
        for gram in tokens.windows(n) {
            let key = normalize_key(&gram.concat());
            if key.chars().count() < 2 {
                continue;
            }
            if seen.insert(key.clone()) {
                keys.push(key);
            }
        }
    }

    keys
}
