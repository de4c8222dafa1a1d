//! Ollama embedding provider.
//!
//! Calls the local `/api/embeddings` endpoint once per text. Failures are
//! reported to the caller as-is; the workflow never retries a collaborator.

use crate::embeddings::EmbeddingProvider;
use async_trait::async_trait;
use herbwise_core::{AppError, AppResult, Collaborator};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

const EMBEDDING_ENDPOINT: &str = "/api/embeddings";

/// Ollama embedding provider using the local API.
#[derive(Debug, Clone)]
pub struct OllamaProvider {
    client: Client,
    base_url: String,
    model: String,
    dimensions: usize,
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    embedding: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: String,
}

impl OllamaProvider {
    pub fn new(base_url: &str, model: &str, dimensions: usize) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            dimensions,
        }
    }

    fn check_dimensions(&self, embedding: &[f32]) -> AppResult<()> {
        if embedding.len() != self.dimensions {
            return Err(AppError::malformed(
                Collaborator::Embedder,
                format!(
                    "model '{}' returned {} dimensions, expected {}",
                    self.model,
                    embedding.len(),
                    self.dimensions
                ),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl EmbeddingProvider for OllamaProvider {
    fn provider_name(&self) -> &str {
        "ollama"
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    #[instrument(skip(self, text), fields(text_len = text.len(), model = %self.model))]
    async fn embed(&self, text: &str) -> AppResult<Vec<f32>> {
        let url = format!("{}{}", self.base_url, EMBEDDING_ENDPOINT);
        let request = EmbeddingRequest {
            model: &self.model,
            prompt: text,
        };

        debug!("Sending embedding request to {}", url);

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::unavailable(Collaborator::Embedder, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            let message = serde_json::from_str::<ErrorResponse>(&error_text)
                .map(|e| e.error)
                .unwrap_or(error_text);

            return Err(AppError::unavailable(
                Collaborator::Embedder,
                format!("Ollama API error ({}): {}", status, message),
            ));
        }

        let body: EmbeddingResponse = response.json().await.map_err(|e| {
            AppError::malformed(
                Collaborator::Embedder,
                format!("Failed to parse Ollama response: {}", e),
            )
        })?;

        self.check_dimensions(&body.embedding)?;
        debug!("Generated {} dimensional embedding", body.embedding.len());

        Ok(body.embedding)
    }
}
