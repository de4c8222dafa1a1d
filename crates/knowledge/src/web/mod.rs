//! Live web search used when the knowledge base comes up short.

pub mod tavily;

use crate::types::Snippet;
use herbwise_core::AppResult;

pub use tavily::TavilySearch;

/// Trait for web search backends.
#[async_trait::async_trait]
pub trait WebSearch: Send + Sync {
    /// Search the web for `query`, best results first.
    async fn search(&self, query: &str) -> AppResult<Vec<Snippet>>;
}
