//! Question-to-passages retrieval.

use crate::embeddings::EmbeddingProvider;
use crate::store::KnowledgeStore;
use crate::types::Passage;
use herbwise_core::config::{EmbeddingConfig, WorkflowConfig};
use herbwise_core::AppResult;
use std::sync::Arc;

/// Fetch candidate passages for a question.
#[async_trait::async_trait]
pub trait Retriever: Send + Sync {
    /// Candidate passages from `collection`, most similar first.
    async fn retrieve(&self, collection: &str, question: &str) -> AppResult<Vec<Passage>>;
}

/// Retriever that embeds the question and searches a vector store.
pub struct KnowledgeRetriever {
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn KnowledgeStore>,
    query_instruction: String,
    top_k: usize,
    score_floor: f32,
}

impl KnowledgeRetriever {
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn KnowledgeStore>,
        query_instruction: impl Into<String>,
        top_k: usize,
        score_floor: f32,
    ) -> Self {
        Self {
            embedder,
            store,
            query_instruction: query_instruction.into(),
            top_k,
            score_floor,
        }
    }

    pub fn from_config(
        embedder: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn KnowledgeStore>,
        embedding: &EmbeddingConfig,
        workflow: &WorkflowConfig,
    ) -> Self {
        Self::new(
            embedder,
            store,
            embedding.query_instruction.clone(),
            workflow.top_k,
            workflow.score_floor,
        )
    }

    /// Text actually sent to the embedder for `question`.
    pub fn query_text(&self, question: &str) -> String {
        format!("{} \"\"\" {} \"\"\"", self.query_instruction.trim_end(), question)
    }
}

#[async_trait::async_trait]
impl Retriever for KnowledgeRetriever {
    async fn retrieve(&self, collection: &str, question: &str) -> AppResult<Vec<Passage>> {
        let embedding = self.embedder.embed(&self.query_text(question)).await?;

        let hits = self
            .store
            .search(collection, &embedding, self.score_floor, self.top_k)
            .await?;

        tracing::debug!(
            "Retrieved {} passages from '{}' via {}",
            hits.len(),
            collection,
            self.store.backend_name()
        );

        Ok(hits.into_iter().map(Passage::from).collect())
    }
}
