//! Vector store abstraction.
//!
//! A store answers one question: which stored passages of a collection are
//! closest to this query vector. Indexing is done by a separate pipeline.

pub mod memory;
pub mod qdrant;

use crate::types::StoreHit;
use herbwise_core::config::StoreConfig;
use herbwise_core::{AppError, AppResult};
use std::sync::Arc;

pub use memory::MemoryStore;
pub use qdrant::QdrantStore;

/// Trait for vector store backends.
#[async_trait::async_trait]
pub trait KnowledgeStore: Send + Sync {
    /// Backend name (e.g. "qdrant")
    fn backend_name(&self) -> &str;

    /// Search `collection` for the passages nearest to `embedding`.
    ///
    /// Returns at most `limit` hits with a score of at least `score_floor`,
    /// ordered by descending score.
    async fn search(
        &self,
        collection: &str,
        embedding: &[f32],
        score_floor: f32,
        limit: usize,
    ) -> AppResult<Vec<StoreHit>>;
}

/// Create a store backend from configuration.
///
/// `MemoryStore` is not selectable here: it starts empty and is filled
/// through [`MemoryStore::insert`] by code that owns the passages.
pub fn create_store(config: &StoreConfig) -> AppResult<Arc<dyn KnowledgeStore>> {
    match config.provider.as_str() {
        "qdrant" => Ok(Arc::new(QdrantStore::new(
            &config.resolve_url(),
            config.resolve_api_key(),
            config.hnsw_ef,
            config.exact,
        )?)),
        other => Err(AppError::Config(format!(
            "Unknown store provider: '{}'. Supported providers: qdrant",
            other
        ))),
    }
}
