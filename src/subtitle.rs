//! Subtitle documents: SRT parsing/formatting, strict WebVTT output and
//! structure-preserving batch translation.
//!
//! Timing fields are copied verbatim through every transformation; only cue
//! text ever changes.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::asr::AsrSegment;
use crate::translate::TranslationService;

static TIMESTAMP_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(\d{2}):(\d{2}):(\d{2})[,.](\d{3})\s*-->\s*(\d{2}):(\d{2}):(\d{2})[,.](\d{3})\s*$")
        .expect("timestamp pattern must compile")
});

/// One timed subtitle entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cue {
    pub index: usize,
    pub start_ms: u64,
    pub end_ms: u64,
    pub text: String,
}

/// An ordered sequence of cues for one language track.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubtitleDocument {
    pub cues: Vec<Cue>,
}

impl SubtitleDocument {
    /// Build a document from ASR segments, converting seconds to millisecond
    /// cue timings.
    pub fn from_segments(segments: &[AsrSegment]) -> Self {
        let cues = segments
            .iter()
            .enumerate()
            .map(|(i, seg)| Cue {
                index: i + 1,
                start_ms: (seg.start * 1000.0).round() as u64,
                end_ms: (seg.end * 1000.0).round() as u64,
                text: seg.text.trim().to_string(),
            })
            .collect();
        Self { cues }
    }

    /// Parse SRT text. Blocks without a valid timestamp line are skipped;
    /// the rest of the document still parses.
    pub fn parse_srt(input: &str) -> Self {
        let normalized = input.replace("\r\n", "\n");
        let mut cues: Vec<Cue> = Vec::new();

        for block in normalized.split("\n\n") {
            if block.trim().is_empty() {
                continue;
            }
            let mut lines = block.lines().peekable();

            // Optional integer index line.
            let mut parsed_index = None;
            if let Some(first) = lines.peek() {
                if let Ok(idx) = first.trim().parse::<usize>() {
                    parsed_index = Some(idx);
                    lines.next();
                }
            }

            let Some(timing_line) = lines.next() else {
                continue;
            };
            let Some((start_ms, end_ms)) = parse_timestamp_line(timing_line) else {
                warn!("Skipping subtitle block without a valid timestamp line");
                continue;
            };

            let text = lines.collect::<Vec<_>>().join("\n").trim().to_string();
            cues.push(Cue {
                index: parsed_index.unwrap_or(cues.len() + 1),
                start_ms,
                end_ms,
                text,
            });
        }

        Self { cues }
    }

    /// Serialize to SRT (index line, comma timestamps).
    pub fn to_srt(&self) -> String {
        let mut out = String::new();
        for cue in &self.cues {
            out.push_str(&format!(
                "{}\n{} --> {}\n{}\n\n",
                cue.index,
                format_timestamp(cue.start_ms, ','),
                format_timestamp(cue.end_ms, ','),
                cue.text
            ));
        }
        out
    }

    /// Serialize to strict WebVTT: header line, period timestamps, no index
    /// lines. The SRT index is dropped in this direction.
    pub fn to_vtt(&self) -> String {
        let mut out = String::from("WEBVTT\n\n");
        for cue in &self.cues {
            out.push_str(&format!(
                "{} --> {}\n{}\n\n",
                format_timestamp(cue.start_ms, '.'),
                format_timestamp(cue.end_ms, '.'),
                cue.text
            ));
        }
        out
    }
}

fn parse_timestamp_line(line: &str) -> Option<(u64, u64)> {
    let caps = TIMESTAMP_RE.captures(line)?;
    let field = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<u64>().ok());
    let time = |h: u64, m: u64, s: u64, ms: u64| ((h * 60 + m) * 60 + s) * 1000 + ms;
    Some((
        time(field(1)?, field(2)?, field(3)?, field(4)?),
        time(field(5)?, field(6)?, field(7)?, field(8)?),
    ))
}

fn format_timestamp(ms: u64, decimal: char) -> String {
    let h = ms / 3_600_000;
    let m = (ms % 3_600_000) / 60_000;
    let s = (ms % 60_000) / 1_000;
    let millis = ms % 1_000;
    format!("{h:02}:{m:02}:{s:02}{decimal}{millis:03}")
}

/// Translate a whole document in one batched call, preserving cue count,
/// indices and timings. Empty cues stay empty without touching any backend.
pub async fn translate_document(
    doc: &SubtitleDocument,
    translator: &TranslationService,
    src_lang: &str,
    tgt_lang: &str,
) -> SubtitleDocument {
    let texts: Vec<String> = doc.cues.iter().map(|c| c.text.clone()).collect();
    let translated = translator.translate(&texts, src_lang, tgt_lang).await;

    let cues = doc
        .cues
        .iter()
        .zip(translated)
        .map(|(cue, text)| Cue {
            index: cue.index,
            start_ms: cue.start_ms,
            end_ms: cue.end_ms,
            text,
        })
        .collect();

    SubtitleDocument { cues }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translate::TranslationCache;
    use crate::translate::backend::MockTranslateBackend;
    use std::sync::Arc;

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(0, ','), "00:00:00,000");
        assert_eq!(format_timestamp(65_123, ','), "00:01:05,123");
        assert_eq!(format_timestamp(3_661_500, '.'), "01:01:01.500");
    }

    #[test]
    fn test_parse_srt_roundtrip() {
        let input = "1\n00:00:00,000 --> 00:00:01,000\n안녕\n\n2\n00:00:01,000 --> 00:00:02,000\n세상\n\n";
        let doc = SubtitleDocument::parse_srt(input);
        assert_eq!(doc.cues.len(), 2);
        assert_eq!(doc.cues[0].text, "안녕");
        assert_eq!(doc.cues[1].start_ms, 1000);
        assert_eq!(doc.to_srt(), input);
    }

    #[test]
    fn test_parse_srt_without_index_lines() {
        let input = "00:00:00,000 --> 00:00:01,000\nhello\n\n00:00:01,500 --> 00:00:02,000\nworld\n\n";
        let doc = SubtitleDocument::parse_srt(input);
        assert_eq!(doc.cues.len(), 2);
        assert_eq!(doc.cues[0].index, 1);
        assert_eq!(doc.cues[1].index, 2);
        assert_eq!(doc.cues[1].start_ms, 1500);
    }

    #[test]
    fn test_parse_srt_skips_malformed_blocks() {
        let input = "1\n00:00:00,000 --> 00:00:01,000\nok\n\nnot a cue at all\n\n3\n00:00:02,000 --> 00:00:03,000\nstill ok\n\n";
        let doc = SubtitleDocument::parse_srt(input);
        assert_eq!(doc.cues.len(), 2);
        assert_eq!(doc.cues[1].text, "still ok");
    }

    #[test]
    fn test_parse_srt_multiline_text() {
        let input = "1\n00:00:00,000 --> 00:00:01,000\nfirst line\nsecond line\n\n";
        let doc = SubtitleDocument::parse_srt(input);
        assert_eq!(doc.cues[0].text, "first line\nsecond line");
    }

    #[test]
    fn test_to_vtt_strict_form() {
        let doc = SubtitleDocument {
            cues: vec![Cue {
                index: 7,
                start_ms: 500,
                end_ms: 1250,
                text: "안녕".to_string(),
            }],
        };
        let vtt = doc.to_vtt();
        assert!(vtt.starts_with("WEBVTT\n\n"));
        assert!(vtt.contains("00:00:00.500 --> 00:00:01.250"));
        // The index line is dropped in the strict form.
        assert!(!vtt.contains("7\n00:00"));
    }

    #[test]
    fn test_from_segments_millisecond_conversion() {
        let segments = vec![
            AsrSegment {
                start: 0.0,
                end: 1.0,
                text: " 안녕 ".to_string(),
            },
            AsrSegment {
                start: 1.0,
                end: 2.25,
                text: "세상".to_string(),
            },
        ];
        let doc = SubtitleDocument::from_segments(&segments);
        assert_eq!(doc.cues[0].index, 1);
        assert_eq!(doc.cues[0].text, "안녕");
        assert_eq!(doc.cues[1].end_ms, 2250);
    }

    fn english_service() -> TranslationService {
        let mut direct = MockTranslateBackend::new();
        direct.expect_id().return_const("opus");
        direct.expect_supports().returning(|src, tgt| src == "ko" && tgt == "en");
        direct.expect_translate_batch().returning(|batch, _, _| {
            Ok(batch.iter().map(|t| format!("english({t})")).collect())
        });
        let mut multilingual = MockTranslateBackend::new();
        multilingual.expect_id().return_const("m2m");
        multilingual.expect_supports().returning(|_, _| false);
        multilingual.expect_translate_batch().never();
        TranslationService::new(
            Box::new(direct),
            Box::new(multilingual),
            Arc::new(TranslationCache::new()),
            240,
        )
    }

    #[tokio::test]
    async fn test_translate_document_preserves_structure() {
        let doc = SubtitleDocument {
            cues: vec![
                Cue {
                    index: 1,
                    start_ms: 0,
                    end_ms: 1000,
                    text: "안녕".to_string(),
                },
                Cue {
                    index: 2,
                    start_ms: 1000,
                    end_ms: 2000,
                    text: "세상".to_string(),
                },
            ],
        };
        let translated = translate_document(&doc, &english_service(), "ko", "en").await;

        assert_eq!(translated.cues.len(), doc.cues.len());
        for (before, after) in doc.cues.iter().zip(&translated.cues) {
            assert_eq!(before.index, after.index);
            assert_eq!(before.start_ms, after.start_ms);
            assert_eq!(before.end_ms, after.end_ms);
            assert!(!after.text.is_empty());
        }
        assert_eq!(translated.cues[0].text, "english(안녕)");
    }

    #[tokio::test]
    async fn test_translate_document_keeps_empty_cues_empty() {
        let doc = SubtitleDocument {
            cues: vec![Cue {
                index: 1,
                start_ms: 0,
                end_ms: 500,
                text: String::new(),
            }],
        };
        let translated = translate_document(&doc, &english_service(), "ko", "en").await;
        assert_eq!(translated.cues[0].text, "");
    }
}
