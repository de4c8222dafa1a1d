//! In-process vector store.
//!
//! Brute-force cosine search over passages held in memory. The store starts
//! empty and is filled through `insert`, so it is not selectable from config.

use super::KnowledgeStore;
use crate::types::StoreHit;
use herbwise_core::{AppError, AppResult, Collaborator};
use std::collections::HashMap;
use std::sync::RwLock;

#[derive(Debug, Clone)]
struct StoredPassage {
    content: String,
    provenance: String,
    embedding: Vec<f32>,
}

/// Collections of embedded passages kept in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Vec<StoredPassage>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an embedded passage to `collection`, creating it if needed.
    pub fn insert(
        &self,
        collection: &str,
        content: impl Into<String>,
        provenance: impl Into<String>,
        embedding: Vec<f32>,
    ) -> AppResult<()> {
        let mut collections = self
            .collections
            .write()
            .map_err(|_| AppError::Other("memory store lock poisoned".to_string()))?;

        collections
            .entry(collection.to_string())
            .or_default()
            .push(StoredPassage {
                content: content.into(),
                provenance: provenance.into(),
                embedding,
            });
        Ok(())
    }
}

#[async_trait::async_trait]
impl KnowledgeStore for MemoryStore {
    fn backend_name(&self) -> &str {
        "memory"
    }

    async fn search(
        &self,
        collection: &str,
        embedding: &[f32],
        score_floor: f32,
        limit: usize,
    ) -> AppResult<Vec<StoreHit>> {
        let collections = self.collections.read().map_err(|_| {
            AppError::unavailable(Collaborator::KnowledgeStore, "memory store lock poisoned")
        })?;

        let Some(passages) = collections.get(collection) else {
            return Err(AppError::unavailable(
                Collaborator::KnowledgeStore,
                format!("collection '{}' not found", collection),
            ));
        };

        let mut hits: Vec<StoreHit> = passages
            .iter()
            .map(|p| StoreHit {
                content: p.content.clone(),
                provenance: p.provenance.clone(),
                score: cosine_similarity(embedding, &p.embedding),
            })
            .filter(|hit| hit.score >= score_floor)
            .collect();

        hits.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        hits.truncate(limit);

        tracing::debug!(
            "Memory store returned {} hits from '{}' (limit {})",
            hits.len(),
            collection,
            limit
        );

        Ok(hits)
    }
}

/// Cosine similarity of two vectors; 0.0 when either is zero or lengths differ.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> MemoryStore {
        let store = MemoryStore::new();
        store.insert("herbs", "Peppermint eases colic.", "ch1", vec![1.0, 0.0]).unwrap();
        store.insert("herbs", "Valerian aids sleep.", "ch2", vec![0.8, 0.6]).unwrap();
        store.insert("herbs", "Comfrey knits bone.", "ch3", vec![0.0, 1.0]).unwrap();
        store
    }

    #[test]
    fn test_cosine_similarity() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
    }

    #[tokio::test]
    async fn test_search_orders_and_applies_floor() {
        let store = seeded();
        let hits = store.search("herbs", &[1.0, 0.0], 0.5, 10).await.unwrap();

        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].provenance, "ch1");
        assert_eq!(hits[1].provenance, "ch2");
        assert!(hits[0].score >= hits[1].score);
    }

    #[tokio::test]
    async fn test_search_respects_limit() {
        let store = seeded();
        let hits = store.search("herbs", &[1.0, 1.0], -1.0, 1).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].provenance, "ch2");
    }

    #[tokio::test]
    async fn test_unknown_collection_is_unavailable() {
        let store = seeded();
        let err = store.search("minerals", &[1.0, 0.0], 0.0, 10).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::CollaboratorUnavailable {
                collaborator: Collaborator::KnowledgeStore,
                ..
            }
        ));
    }
}
