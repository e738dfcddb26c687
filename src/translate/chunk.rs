//! Sentence-sized chunking for bounded-input translation models.
//!
//! Backends silently truncate over-long inputs, so long text is split at
//! sentence boundaries before translation and the translated chunks are
//! rejoined with single spaces.

/// Sentence-final punctuation across the supported scripts.
const SENTENCE_FINAL: &[char] = &['.', '!', '?', '…', '。', '！', '？'];

/// Korean sentence-final morpheme syllables that end a sentence when followed
/// by whitespace, covering speech without written punctuation.
const KO_FINAL_SYLLABLES: &[char] = &['다', '요', '죠', '까', '네'];

/// Split text into sentences using punctuation plus, for Korean, common
/// sentence-final morpheme markers.
pub fn split_sentences(text: &str, lang: &str) -> Vec<String> {
    let korean = lang == "ko";
    let chars: Vec<char> = text.chars().collect();
    let mut sentences = Vec::new();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        current.push(c);
        let next_is_break = chars.get(i + 1).map_or(true, |n| n.is_whitespace());
        let boundary = (SENTENCE_FINAL.contains(&c) && next_is_break)
            || (korean && KO_FINAL_SYLLABLES.contains(&c) && next_is_break);
        if boundary {
            let sentence = current.trim();
            if !sentence.is_empty() {
                sentences.push(sentence.to_string());
            }
            current.clear();
        }
    }

    let tail = current.trim();
    if !tail.is_empty() {
        sentences.push(tail.to_string());
    }

    sentences
}

/// Split an over-long sentence on whitespace into pieces below `max_chars`.
fn split_by_length(text: &str, max_chars: usize) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if !current.is_empty() && current.chars().count() + word.chars().count() + 1 > max_chars {
            pieces.push(current.clone());
            current.clear();
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        pieces.push(current);
    }

    pieces
}

/// Chunk text for one backend call. Text already below `max_chars` passes
/// through whole; longer text is split into sentence groups below the limit,
/// preserving order.
pub fn chunk_text(text: &str, lang: &str, max_chars: usize) -> Vec<String> {
    if text.chars().count() <= max_chars {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut current = String::new();

    for sentence in split_sentences(text, lang) {
        let sentence_len = sentence.chars().count();
        if sentence_len > max_chars {
            if !current.is_empty() {
                chunks.push(current.clone());
                current.clear();
            }
            chunks.extend(split_by_length(&sentence, max_chars));
            continue;
        }
        if !current.is_empty() && current.chars().count() + sentence_len + 1 > max_chars {
            chunks.push(current.clone());
            current.clear();
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(&sentence);
    }
    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_sentences_punctuation() {
        let sentences = split_sentences("First one. Second one! Third?", "en");
        assert_eq!(sentences, vec!["First one.", "Second one!", "Third?"]);
    }

    #[test]
    fn test_split_sentences_korean_morphemes() {
        let sentences = split_sentences("서버를 다시 시작했습니다 이제 잘 됩니다", "ko");
        assert_eq!(sentences, vec!["서버를 다시 시작했습니다", "이제 잘 됩니다"]);
    }

    #[test]
    fn test_split_sentences_korean_markers_inactive_for_english() {
        let sentences = split_sentences("서버를 다시 시작했습니다 이제 잘 됩니다", "en");
        assert_eq!(sentences.len(), 1);
    }

    #[test]
    fn test_chunk_short_text_passes_through() {
        assert_eq!(chunk_text("짧은 문장입니다.", "ko", 240), vec!["짧은 문장입니다."]);
    }

    #[test]
    fn test_chunk_long_text_stays_under_limit_and_ordered() {
        let text = "하나입니다. 둘입니다. 셋입니다. 넷입니다.";
        let chunks = chunk_text(text, "ko", 14);
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 14);
        }
        assert_eq!(chunks.join(" "), text);
    }

    #[test]
    fn test_chunk_unpunctuated_text_falls_back_to_whitespace() {
        let text = "aaa bbb ccc ddd eee fff";
        let chunks = chunk_text(text, "en", 8);
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 8);
        }
        assert_eq!(chunks.join(" "), text);
    }
}
