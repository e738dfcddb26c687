//! Language code canonicalization and script classification.
//!
//! Subtitle tracks and glossary entries are matched per writing system, so
//! both free-form language codes and raw text need a stable classification
//! before any index lookup or backend call.

use serde::{Deserialize, Serialize};

/// Writing system used to partition the term index and classify query text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Script {
    #[serde(rename = "ko")]
    Korean,
    #[serde(rename = "en")]
    Latin,
    #[serde(rename = "ja")]
    Japanese,
    #[serde(rename = "zh")]
    Chinese,
    #[serde(rename = "other")]
    Other,
}

impl Script {
    /// Stable wire code, matching the canonical language code of the script.
    pub fn code(&self) -> &'static str {
        match self {
            Script::Korean => "ko",
            Script::Latin => "en",
            Script::Japanese => "ja",
            Script::Chinese => "zh",
            Script::Other => "other",
        }
    }

    pub fn from_code(code: &str) -> Option<Script> {
        match code {
            "ko" => Some(Script::Korean),
            "en" => Some(Script::Latin),
            "ja" => Some(Script::Japanese),
            "zh" => Some(Script::Chinese),
            "other" => Some(Script::Other),
            _ => None,
        }
    }
}

impl std::fmt::Display for Script {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Map regional and abbreviated language codes to their canonical form.
///
/// Unknown codes pass through trimmed and lower-cased; an empty code falls
/// back to "en".
pub fn canonicalize_code(code: &str) -> String {
    let code = code.trim().to_lowercase();
    if code.is_empty() {
        return "en".to_string();
    }
    match code.as_str() {
        "kr" | "kor" => "ko",
        "jp" | "jap" => "ja",
        "cn" | "chs" | "chi" | "zh-cn" | "zh_cn" | "zh-hans" | "zh-tw" | "zh_tw" | "zh-hant" => {
            "zh"
        }
        "fil" => "tl",
        other => other,
    }
    .to_string()
}

fn is_hangul(c: char) -> bool {
    matches!(c, '\u{AC00}'..='\u{D7AF}' | '\u{1100}'..='\u{11FF}' | '\u{3130}'..='\u{318F}')
}

fn is_latin(c: char) -> bool {
    c.is_ascii_alphabetic() || matches!(c, '\u{00C0}'..='\u{024F}')
}

fn is_kana(c: char) -> bool {
    matches!(c, '\u{3040}'..='\u{309F}' | '\u{30A0}'..='\u{30FF}')
}

fn is_han(c: char) -> bool {
    matches!(c, '\u{4E00}'..='\u{9FFF}' | '\u{3400}'..='\u{4DBF}')
}

/// Classify text by its dominant script.
///
/// Counts characters in the Hangul, Latin, Hiragana/Katakana and CJK-ideograph
/// ranges; the highest count wins, ties broken ko > en > ja > zh. Text with no
/// countable characters (including empty text) is `Other`.
pub fn detect_script(text: &str) -> Script {
    let mut hangul = 0usize;
    let mut latin = 0usize;
    let mut kana = 0usize;
    let mut han = 0usize;

    for c in text.chars() {
        if is_hangul(c) {
            hangul += 1;
        } else if is_latin(c) {
            latin += 1;
        } else if is_kana(c) {
            kana += 1;
        } else if is_han(c) {
            han += 1;
        }
    }

    let mut best = Script::Other;
    let mut best_count = 0usize;
    for (script, count) in [
        (Script::Korean, hangul),
        (Script::Latin, latin),
        (Script::Japanese, kana),
        (Script::Chinese, han),
    ] {
        if count > best_count {
            best = script;
            best_count = count;
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonicalize_aliases() {
        assert_eq!(canonicalize_code("kr"), "ko");
        assert_eq!(canonicalize_code("KOR"), "ko");
        assert_eq!(canonicalize_code("jp"), "ja");
        assert_eq!(canonicalize_code("zh-CN"), "zh");
        assert_eq!(canonicalize_code("zh-Hant"), "zh");
    }

    #[test]
    fn test_canonicalize_passthrough() {
        assert_eq!(canonicalize_code(" FR "), "fr");
        assert_eq!(canonicalize_code("de"), "de");
        assert_eq!(canonicalize_code(""), "en");
    }

    #[test]
    fn test_detect_hangul() {
        assert_eq!(detect_script("이 네트워크는 빠르다"), Script::Korean);
    }

    #[test]
    fn test_detect_latin() {
        assert_eq!(detect_script("The network is fast."), Script::Latin);
    }

    #[test]
    fn test_detect_japanese_kana_dominates_kanji() {
        // Kanji count toward the ideograph bucket, but kana decide Japanese text.
        assert_eq!(detect_script("これはネットワークです"), Script::Japanese);
    }

    #[test]
    fn test_detect_chinese() {
        assert_eq!(detect_script("这个网络很快"), Script::Chinese);
    }

    #[test]
    fn test_detect_empty_and_symbols() {
        assert_eq!(detect_script(""), Script::Other);
        assert_eq!(detect_script("123 !?"), Script::Other);
    }

    #[test]
    fn test_detect_mixed_prefers_majority() {
        assert_eq!(detect_script("DNS 서버를 다시 시작했습니다"), Script::Korean);
    }
}
