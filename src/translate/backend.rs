//! Translation capability providers.
//!
//! Every backend speaks the same batch contract against a model-serving HTTP
//! endpoint; the chain in `chain.rs` decides which backend handles a request.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;
use tracing::debug;

use crate::config::TranslateConfig;
use crate::error::{JamakError, Result};

#[derive(Debug, Clone, Serialize)]
pub struct BackendRequest {
    pub model: String,
    pub texts: Vec<String>,
    pub source_lang: String,
    pub target_lang: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BackendResponse {
    pub translations: Vec<String>,
}

/// One translation-capability provider invoked through a uniform
/// batch-translate contract. Implementations must preserve input length and
/// order; failures are returned, never panicked.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TranslateBackend: Send + Sync {
    /// Stable identifier, used as the cache namespace for this backend.
    fn id(&self) -> &'static str;

    /// Whether this backend covers the (already canonicalized) language pair.
    fn supports(&self, src: &str, tgt: &str) -> bool;

    async fn translate_batch(&self, texts: &[String], src: &str, tgt: &str) -> Result<Vec<String>>;
}

async fn post_batch(
    client: &Client,
    endpoint: &str,
    request: &BackendRequest,
) -> Result<Vec<String>> {
    let url = format!("{}/translate", endpoint);
    debug!("Sending {} texts to {} ({})", request.texts.len(), url, request.model);

    let response = client
        .post(&url)
        .json(request)
        .send()
        .await
        .map_err(|e| JamakError::Backend(format!("model server request failed: {e}")))?;

    if !response.status().is_success() {
        let status = response.status();
        let error_text = response.text().await.unwrap_or_default();
        return Err(JamakError::Backend(format!(
            "model server error {status}: {error_text}"
        )));
    }

    let parsed: BackendResponse = response
        .json()
        .await
        .map_err(|e| JamakError::Backend(format!("failed to parse model server response: {e}")))?;

    if parsed.translations.len() != request.texts.len() {
        return Err(JamakError::Backend(format!(
            "model server returned {} translations for {} inputs",
            parsed.translations.len(),
            request.texts.len()
        )));
    }

    Ok(parsed.translations)
}

fn build_client(timeout_secs: u64) -> Client {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .expect("HTTP client creation should not fail")
}

/// Direct backend: one registered model per language pair.
pub struct PairBackend {
    client: Client,
    endpoint: String,
    pairs: HashSet<(String, String)>,
}

impl PairBackend {
    pub fn new(config: &TranslateConfig) -> Self {
        let pairs = config
            .direct_pairs
            .iter()
            .filter_map(|pair| {
                pair.split_once('-')
                    .map(|(src, tgt)| (src.to_string(), tgt.to_string()))
            })
            .collect();
        Self {
            client: build_client(config.timeout_secs),
            endpoint: config.endpoint.clone(),
            pairs,
        }
    }

    fn model_for(src: &str, tgt: &str) -> String {
        format!("opus-mt-{src}-{tgt}")
    }
}

#[async_trait]
impl TranslateBackend for PairBackend {
    fn id(&self) -> &'static str {
        "opus"
    }

    fn supports(&self, src: &str, tgt: &str) -> bool {
        self.pairs.contains(&(src.to_string(), tgt.to_string()))
    }

    async fn translate_batch(&self, texts: &[String], src: &str, tgt: &str) -> Result<Vec<String>> {
        let request = BackendRequest {
            model: Self::model_for(src, tgt),
            texts: texts.to_vec(),
            source_lang: src.to_string(),
            target_lang: tgt.to_string(),
        };
        post_batch(&self.client, &self.endpoint, &request).await
    }
}

/// Last-resort backend: a single many-to-many multilingual model.
pub struct MultilingualBackend {
    client: Client,
    endpoint: String,
    model: String,
}

impl MultilingualBackend {
    pub fn new(config: &TranslateConfig) -> Self {
        Self {
            client: build_client(config.timeout_secs),
            endpoint: config.endpoint.clone(),
            model: config.multilingual_model.clone(),
        }
    }
}

#[async_trait]
impl TranslateBackend for MultilingualBackend {
    fn id(&self) -> &'static str {
        "m2m"
    }

    fn supports(&self, src: &str, tgt: &str) -> bool {
        !src.is_empty() && !tgt.is_empty() && src != tgt
    }

    async fn translate_batch(&self, texts: &[String], src: &str, tgt: &str) -> Result<Vec<String>> {
        let request = BackendRequest {
            model: self.model.clone(),
            texts: texts.to_vec(),
            source_lang: src.to_string(),
            target_lang: tgt.to_string(),
        };
        post_batch(&self.client, &self.endpoint, &request).await
    }
}
