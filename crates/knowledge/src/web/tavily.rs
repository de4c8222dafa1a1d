//! Tavily search API client.

use super::WebSearch;
use crate::types::Snippet;
use herbwise_core::config::WebSearchConfig;
use herbwise_core::{AppError, AppResult, Collaborator};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Tavily web search client.
#[derive(Debug, Clone)]
pub struct TavilySearch {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    max_results: usize,
}

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
    max_results: usize,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    url: String,
    #[serde(default)]
    content: String,
}

impl TavilySearch {
    pub fn new(endpoint: &str, api_key: Option<String>, max_results: usize) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.to_string(),
            api_key,
            max_results,
        }
    }

    pub fn from_config(config: &WebSearchConfig) -> Self {
        Self::new(
            &config.endpoint,
            config.resolve_api_key(),
            config.max_results,
        )
    }
}

#[async_trait::async_trait]
impl WebSearch for TavilySearch {
    #[instrument(skip(self), fields(max_results = self.max_results))]
    async fn search(&self, query: &str) -> AppResult<Vec<Snippet>> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            AppError::unavailable(Collaborator::WebSearch, "no Tavily API key configured")
        })?;

        let request = SearchRequest {
            query,
            max_results: self.max_results,
        };

        debug!("Sending web search request to {}", self.endpoint);

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::unavailable(Collaborator::WebSearch, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::unavailable(
                Collaborator::WebSearch,
                format!("Tavily API error ({}): {}", status, error_text),
            ));
        }

        let body: SearchResponse = response.json().await.map_err(|e| {
            AppError::malformed(
                Collaborator::WebSearch,
                format!("Failed to parse Tavily response: {}", e),
            )
        })?;

        Ok(body
            .results
            .into_iter()
            .map(|r| Snippet::new(r.content, r.url))
            .collect())
    }
}
