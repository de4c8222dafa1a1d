//! Evidence gathering for herbwise.
//!
//! Retrieval from the herbal encyclopedia knowledge base (query embedding
//! plus vector search) and live web search used as a fallback.

pub mod embeddings;
pub mod retriever;
pub mod store;
pub mod types;
pub mod web;

pub use embeddings::{create_provider, EmbeddingProvider};
pub use retriever::{KnowledgeRetriever, Retriever};
pub use store::{create_store, KnowledgeStore, MemoryStore, QdrantStore};
pub use types::{Passage, Snippet, StoreHit};
pub use web::{TavilySearch, WebSearch};
