//! Dictionary file loading: encoding detection, header resolution and row
//! parsing as pure functions, with a thin I/O wrapper.

use encoding_rs::{EUC_KR, Encoding, UTF_8};
use std::path::Path;
use tracing::debug;

use crate::error::{JamakError, Result};

/// One dictionary row, before script classification and indexing.
#[derive(Debug, Clone, PartialEq)]
pub struct DictRow {
    pub term: String,
    pub definition: String,
}

/// Header synonyms for the term column, tried in order.
const TERM_HEADERS: &[&str] = &["표준단어명", "단어명", "용어명", "term", "word"];

/// Header synonyms for the definition column, tried in order.
const DEF_HEADERS: &[&str] = &[
    "표준단어 설명",
    "표준단어설명",
    "설명",
    "정의",
    "definition",
    "description",
];

/// Encodings attempted when the configured encoding is "auto".
const ENCODING_CANDIDATES: &[&Encoding] = &[UTF_8, EUC_KR];

/// Decode dictionary bytes, trying each candidate encoding in order and
/// accepting the first that decodes without replacement characters.
pub fn decode_dictionary(bytes: &[u8], encoding: &str) -> Result<String> {
    let candidates: Vec<&'static Encoding> = if encoding.is_empty() || encoding == "auto" {
        ENCODING_CANDIDATES.to_vec()
    } else {
        match Encoding::for_label(encoding.as_bytes()) {
            Some(enc) => vec![enc],
            None => {
                return Err(JamakError::Load(format!("unknown encoding label '{encoding}'")));
            }
        }
    };

    for enc in &candidates {
        let (decoded, used, had_errors) = enc.decode(bytes);
        if !had_errors {
            debug!("Dictionary decoded as {}", used.name());
            return Ok(decoded.into_owned());
        }
    }

    Err(JamakError::Load(format!(
        "dictionary not decodable with any of {} candidate encodings",
        candidates.len()
    )))
}

/// Resolve term/definition column positions from a header row.
///
/// The configured names are tried first, then the synonym lists, then a
/// positional fallback of column 0 / column 1.
pub fn resolve_columns(header: &[String], term_column: &str, definition_column: &str) -> (usize, usize) {
    let find = |preferred: &str, synonyms: &[&str]| -> Option<usize> {
        header
            .iter()
            .position(|h| h.trim() == preferred)
            .or_else(|| synonyms.iter().find_map(|s| header.iter().position(|h| h.trim() == *s)))
    };

    let term_idx = find(term_column, TERM_HEADERS).unwrap_or(0);
    let def_idx = find(definition_column, DEF_HEADERS).unwrap_or(1);
    (term_idx, def_idx)
}

/// Split a delimited line, honoring double-quoted fields.
fn split_fields(line: &str, delimiter: char) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    field.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            }
            '"' => in_quotes = true,
            c if c == delimiter && !in_quotes => {
                fields.push(field.clone());
                field.clear();
            }
            c => field.push(c),
        }
    }
    fields.push(field);
    fields
}

/// Parse decoded dictionary content into rows. Rows with an empty term are
/// dropped here; everything else is left to the index build.
pub fn parse_rows(content: &str, term_column: &str, definition_column: &str) -> Vec<DictRow> {
    let mut lines = content.lines();
    let header_line = match lines.next() {
        Some(l) => l.trim_start_matches('\u{feff}'),
        None => return Vec::new(),
    };

    // Tab-separated dictionaries are accepted alongside comma-separated ones.
    let delimiter = if header_line.contains('\t') { '\t' } else { ',' };
    let header: Vec<String> = split_fields(header_line, delimiter);
    let (term_idx, def_idx) = resolve_columns(&header, term_column, definition_column);

    let mut rows = Vec::new();
    for line in lines {
        if line.trim().is_empty() {
            continue;
        }
        let fields = split_fields(line, delimiter);
        let term = fields.get(term_idx).map(|s| s.trim()).unwrap_or("");
        if term.is_empty() {
            continue;
        }
        let definition = fields.get(def_idx).map(|s| s.trim()).unwrap_or("");
        rows.push(DictRow {
            term: term.to_string(),
            definition: definition.to_string(),
        });
    }
    rows
}

/// Read and parse a dictionary file.
pub async fn load_rows<P: AsRef<Path>>(
    path: P,
    term_column: &str,
    definition_column: &str,
    encoding: &str,
) -> Result<Vec<DictRow>> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(JamakError::FileNotFound(path.display().to_string()));
    }
    let bytes = tokio::fs::read(path).await?;
    let content = decode_dictionary(&bytes, encoding)?;
    Ok(parse_rows(&content, term_column, definition_column))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_utf8() {
        let content = decode_dictionary("용어,설명\n".as_bytes(), "auto").unwrap();
        assert!(content.starts_with("용어"));
    }

    #[test]
    fn test_decode_euc_kr() {
        let (bytes, _, _) = EUC_KR.encode("용어,설명\n네트워크,연결망\n");
        let content = decode_dictionary(&bytes, "auto").unwrap();
        assert!(content.contains("네트워크"));
    }

    #[test]
    fn test_decode_unknown_label() {
        assert!(decode_dictionary(b"a,b", "no-such-encoding").is_err());
    }

    #[test]
    fn test_resolve_columns_by_synonym() {
        let header = vec!["번호".to_string(), "단어명".to_string(), "설명".to_string()];
        assert_eq!(resolve_columns(&header, "표준단어명", "표준단어 설명"), (1, 2));
    }

    #[test]
    fn test_resolve_columns_positional_fallback() {
        let header = vec!["col_a".to_string(), "col_b".to_string()];
        assert_eq!(resolve_columns(&header, "표준단어명", "표준단어 설명"), (0, 1));
    }

    #[test]
    fn test_parse_rows_skips_empty_terms() {
        let content = "term,definition\n네트워크,연결망\n,정의만 있음\nDNS,이름 풀이\n";
        let rows = parse_rows(content, "term", "definition");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].term, "네트워크");
        assert_eq!(rows[1].term, "DNS");
    }

    #[test]
    fn test_parse_rows_quoted_fields() {
        let content = "term,definition\n\"데이터, 링크\",\"계층 \"\"2\"\" 연결\"\n";
        let rows = parse_rows(content, "term", "definition");
        assert_eq!(rows[0].term, "데이터, 링크");
        assert_eq!(rows[0].definition, "계층 \"2\" 연결");
    }

    #[test]
    fn test_parse_rows_tab_separated() {
        let content = "term\tdefinition\n라우터\t경로 결정 장치\n";
        let rows = parse_rows(content, "term", "definition");
        assert_eq!(rows[0].definition, "경로 결정 장치");
    }

    #[tokio::test]
    async fn test_load_rows_missing_file() {
        let err = load_rows("no/such/file.csv", "term", "definition", "auto")
            .await
            .unwrap_err();
        assert!(matches!(err, JamakError::FileNotFound(_)));
    }

    #[tokio::test]
    async fn test_load_rows_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("glossary.csv");
        std::fs::write(&path, "표준단어명,표준단어 설명\n네트워크,통신 장치들의 연결망\n").unwrap();

        let rows = load_rows(&path, "표준단어명", "표준단어 설명", "auto").await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].term, "네트워크");
    }
}
