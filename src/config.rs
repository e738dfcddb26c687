use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{JamakError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub storage: StorageConfig,
    pub glossary: GlossaryConfig,
    pub translate: TranslateConfig,
    pub asr: AsrConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root directory for per-job artifacts.
    pub root: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlossaryConfig {
    /// Dictionary file (CSV or TSV) with term and definition columns.
    pub path: String,
    /// Preferred term column header; synonyms and position are fallbacks.
    pub term_column: String,
    /// Preferred definition column header.
    pub definition_column: String,
    /// "auto" tries the candidate encodings in order; any other value is an
    /// explicit encoding label.
    pub encoding: String,
    /// Maximum glossary hits returned per query.
    pub result_limit: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslateConfig {
    /// Model server endpoint URL.
    pub endpoint: String,
    /// Registered direct language pairs, as "src-tgt" codes.
    pub direct_pairs: Vec<String>,
    /// Many-to-many model used when no direct or pivot route exists.
    pub multilingual_model: String,
    /// Inputs longer than this are chunked at sentence boundaries.
    pub max_chunk_chars: usize,
    /// Request timeout for backend calls.
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AsrConfig {
    /// Transcription server endpoint URL.
    pub endpoint: String,
    /// Whisper model size or path.
    pub model: String,
    /// Source language of the spoken audio.
    pub language: String,
    /// Request timeout; transcription of long media can take minutes.
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage: StorageConfig {
                root: ".jamak/storage".to_string(),
            },
            glossary: GlossaryConfig {
                path: "data/glossary.csv".to_string(),
                term_column: "표준단어명".to_string(),
                definition_column: "표준단어 설명".to_string(),
                encoding: "auto".to_string(),
                result_limit: 20,
            },
            translate: TranslateConfig {
                endpoint: "http://localhost:8765".to_string(),
                direct_pairs: vec![
                    "ko-en".to_string(),
                    "en-ko".to_string(),
                    "en-ja".to_string(),
                    "ja-en".to_string(),
                    "en-zh".to_string(),
                    "zh-en".to_string(),
                ],
                multilingual_model: "m2m100-418m".to_string(),
                max_chunk_chars: 240,
                timeout_secs: 300,
            },
            asr: AsrConfig {
                endpoint: "http://localhost:9090".to_string(),
                model: "medium".to_string(),
                language: "ko".to_string(),
                timeout_secs: 1800,
            },
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| JamakError::Config(format!("Failed to read config file: {e}")))?;

        toml::from_str(&content)
            .map_err(|e| JamakError::Config(format!("Failed to parse config file: {e}")))
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| JamakError::Config(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path, content)
            .map_err(|e| JamakError::Config(format!("Failed to write config file: {e}")))?;

        Ok(())
    }
}
