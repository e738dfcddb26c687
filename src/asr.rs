//! Speech-to-text producer boundary.
//!
//! Transcription is consumed as an ordered list of timed text segments for
//! one media file; the model invocation behind it is opaque to this crate.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::config::AsrConfig;
use crate::error::{JamakError, Result};

/// One transcribed segment, in seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AsrSegment {
    pub start: f64,
    pub end: f64,
    pub text: String,
}

#[derive(Debug, Clone, Serialize)]
struct TranscribeRequest {
    path: String,
    model: String,
    language: String,
}

#[derive(Debug, Clone, Deserialize)]
struct TranscribeResponse {
    segments: Vec<AsrSegment>,
}

/// Main trait for transcription operations.
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe one media file in the given source language.
    async fn transcribe(&self, media_path: &Path, language: &str) -> Result<Vec<AsrSegment>>;
}

/// Transcriber backed by a whisper-compatible inference server sharing this
/// host's filesystem.
pub struct HttpTranscriber {
    client: Client,
    config: AsrConfig,
}

impl HttpTranscriber {
    pub fn new(config: AsrConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .expect("HTTP client creation should not fail");
        Self { client, config }
    }
}

#[async_trait]
impl Transcriber for HttpTranscriber {
    async fn transcribe(&self, media_path: &Path, language: &str) -> Result<Vec<AsrSegment>> {
        if !media_path.exists() {
            return Err(JamakError::FileNotFound(media_path.display().to_string()));
        }

        let request = TranscribeRequest {
            path: media_path.display().to_string(),
            model: self.config.model.clone(),
            language: language.to_string(),
        };
        let url = format!("{}/transcribe", self.config.endpoint);
        info!("Transcribing {} via {}", media_path.display(), url);

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| JamakError::Asr(format!("transcription request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(JamakError::Asr(format!(
                "transcription server error {status}: {error_text}"
            )));
        }

        let parsed: TranscribeResponse = response
            .json()
            .await
            .map_err(|e| JamakError::Asr(format!("failed to parse transcription response: {e}")))?;

        info!("Transcription produced {} segments", parsed.segments.len());
        Ok(parsed.segments)
    }
}

/// Factory for creating transcriber instances.
pub struct TranscriberFactory;

impl TranscriberFactory {
    pub fn create(config: AsrConfig) -> Box<dyn Transcriber> {
        Box::new(HttpTranscriber::new(config))
    }
}
