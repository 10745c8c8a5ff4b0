//! Remote embeddings over an OpenAI-compatible `/embeddings` endpoint

use std::sync::OnceLock;
use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use super::{finalize_vector, prepare_input, Embedding, EmbeddingError, EmbeddingProvider, MAX_TEXT_LENGTH};
use crate::config::RemoteConfig;

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: Vec<&'a str>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingDatum>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingDatum {
    embedding: Vec<f32>,
    #[serde(default)]
    index: usize,
}

/// HTTP-backed provider
///
/// Must be called from a blocking context; async callers go through
/// `spawn_blocking`. The client is built on first use.
pub struct RemoteEmbedder {
    config: RemoteConfig,
    max_chars: usize,
    client: OnceLock<Result<Client, String>>,
}

impl RemoteEmbedder {
    pub fn new(config: RemoteConfig) -> Self {
        Self {
            config,
            max_chars: MAX_TEXT_LENGTH,
            client: OnceLock::new(),
        }
    }

    pub fn with_max_chars(mut self, max_chars: usize) -> Self {
        self.max_chars = max_chars.max(1);
        self
    }

    fn client(&self) -> Result<&Client, EmbeddingError> {
        self.client
            .get_or_init(|| {
                Client::builder()
                    .timeout(Duration::from_millis(self.config.timeout_ms))
                    .build()
                    .map_err(|e| format!("Failed to build HTTP client: {}", e))
            })
            .as_ref()
            .map_err(|e| EmbeddingError::ModelInit(e.clone()))
    }

    fn request(&self, inputs: Vec<&str>) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let expected = inputs.len();
        let body = EmbeddingRequest {
            model: &self.config.model,
            input: inputs,
        };

        let mut builder = self.client()?.post(&self.config.endpoint).json(&body);
        if let Some(key) = &self.config.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().map_err(|e| self.map_transport_error(e))?;
        let status = response.status();
        if !status.is_success() {
            return Err(EmbeddingError::Backend(format!(
                "embedding endpoint returned HTTP {}",
                status
            )));
        }

        let mut parsed: EmbeddingResponse = response.json().map_err(|e| self.map_transport_error(e))?;
        if parsed.data.len() != expected {
            return Err(EmbeddingError::Backend(format!(
                "requested {} embeddings, endpoint returned {}",
                expected,
                parsed.data.len()
            )));
        }
        parsed.data.sort_by_key(|d| d.index);
        Ok(parsed.data.into_iter().map(|d| d.embedding).collect())
    }

    fn map_transport_error(&self, error: reqwest::Error) -> EmbeddingError {
        if error.is_timeout() {
            tracing::warn!(endpoint = %self.config.endpoint, "Embedding request timed out");
            EmbeddingError::Timeout(self.config.timeout_ms)
        } else {
            EmbeddingError::Backend(error.to_string())
        }
    }
}

impl EmbeddingProvider for RemoteEmbedder {
    fn model_name(&self) -> &str {
        &self.config.model
    }

    fn dimensions(&self) -> usize {
        self.config.dimensions
    }

    fn embed(&self, text: &str) -> Result<Embedding, EmbeddingError> {
        let text = prepare_input(text, self.max_chars)?;
        let vector = self
            .request(vec![text])?
            .pop()
            .ok_or_else(|| EmbeddingError::Backend("No embedding generated".to_string()))?;
        finalize_vector(vector, self.config.dimensions)
    }
}
