//! Qdrant vector store over the gRPC client.

use super::KnowledgeStore;
use crate::types::StoreHit;
use herbwise_core::{AppError, AppResult, Collaborator};
use qdrant_client::qdrant::{
    value::Kind, with_payload_selector::SelectorOptions, PayloadIncludeSelector,
    SearchParamsBuilder, SearchPoints, SearchPointsBuilder, Value,
};
use qdrant_client::Qdrant;
use std::collections::HashMap;
use tracing::{debug, instrument};

/// Payload keys that may carry a passage's provenance, in priority order.
const PROVENANCE_KEYS: &[&str] = &["ebook_chapter", "spec", "source"];

/// Payload key holding the passage text.
const CONTENT_KEY: &str = "content";

/// Qdrant client for point search.
pub struct QdrantStore {
    client: Qdrant,
    hnsw_ef: u32,
    exact: bool,
}

impl QdrantStore {
    /// Build a client for `url`. No connection is made until the first search.
    pub fn new(url: &str, api_key: Option<String>, hnsw_ef: u32, exact: bool) -> AppResult<Self> {
        let client = Qdrant::from_url(url)
            .api_key(api_key)
            .build()
            .map_err(|e| AppError::Config(format!("Invalid Qdrant url '{}': {}", url, e)))?;

        Ok(Self {
            client,
            hnsw_ef,
            exact,
        })
    }

    fn search_request(
        &self,
        collection: &str,
        embedding: &[f32],
        score_floor: f32,
        limit: usize,
    ) -> SearchPoints {
        let mut fields = vec![CONTENT_KEY.to_string()];
        fields.extend(PROVENANCE_KEYS.iter().map(|key| key.to_string()));

        SearchPointsBuilder::new(collection, embedding.to_vec(), limit as u64)
            .score_threshold(score_floor)
            .with_payload(SelectorOptions::Include(PayloadIncludeSelector { fields }))
            .params(
                SearchParamsBuilder::default()
                    .hnsw_ef(u64::from(self.hnsw_ef))
                    .exact(self.exact),
            )
            .build()
    }
}

fn string_field<'a>(payload: &'a HashMap<String, Value>, key: &str) -> Option<&'a str> {
    match payload.get(key)?.kind.as_ref()? {
        Kind::StringValue(s) => Some(s.as_str()),
        _ => None,
    }
}

/// Convert one scored point's payload into a hit.
///
/// A point without a string `content` payload is a contract violation.
fn payload_to_hit(payload: &HashMap<String, Value>, score: f32) -> AppResult<StoreHit> {
    let content = string_field(payload, CONTENT_KEY)
        .ok_or_else(|| {
            AppError::malformed(
                Collaborator::KnowledgeStore,
                "point payload has no 'content' field",
            )
        })?
        .to_string();

    let provenance = PROVENANCE_KEYS
        .iter()
        .find_map(|key| string_field(payload, key))
        .unwrap_or_default()
        .to_string();

    Ok(StoreHit {
        content,
        provenance,
        score,
    })
}

#[async_trait::async_trait]
impl KnowledgeStore for QdrantStore {
    fn backend_name(&self) -> &str {
        "qdrant"
    }

    #[instrument(skip(self, embedding), fields(dims = embedding.len()))]
    async fn search(
        &self,
        collection: &str,
        embedding: &[f32],
        score_floor: f32,
        limit: usize,
    ) -> AppResult<Vec<StoreHit>> {
        let request = self.search_request(collection, embedding, score_floor, limit);

        debug!("Searching collection {}", collection);

        let response = self
            .client
            .search_points(request)
            .await
            .map_err(|e| AppError::unavailable(Collaborator::KnowledgeStore, e.to_string()))?;

        let hits = response
            .result
            .iter()
            .map(|point| payload_to_hit(&point.payload, point.score))
            .collect::<AppResult<Vec<_>>>()?;

        debug!("Qdrant returned {} hits", hits.len());
        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Value {
        Value {
            kind: Some(Kind::StringValue(s.to_string())),
        }
    }

    fn payload(pairs: &[(&str, &str)]) -> HashMap<String, Value> {
        pairs
            .iter()
            .map(|(key, value)| (key.to_string(), text(value)))
            .collect()
    }

    #[tokio::test]
    async fn test_search_request_shape() {
        let store = QdrantStore::new("http://localhost:6334", None, 128, true).unwrap();
        let request = store.search_request("herbs", &[0.5, 0.25], 0.8, 10);

        assert_eq!(request.collection_name, "herbs");
        assert_eq!(request.vector, vec![0.5, 0.25]);
        assert_eq!(request.limit, 10);
        assert_eq!(request.score_threshold, Some(0.8));

        let params = request.params.unwrap();
        assert_eq!(params.hnsw_ef, Some(128));
        assert_eq!(params.exact, Some(true));

        match request.with_payload.unwrap().selector_options {
            Some(SelectorOptions::Include(include)) => {
                assert_eq!(
                    include.fields,
                    vec!["content", "ebook_chapter", "spec", "source"]
                );
            }
            other => panic!("expected payload include selector, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_api_key_is_optional() {
        assert!(QdrantStore::new("http://localhost:6334", None, 64, false).is_ok());
        assert!(
            QdrantStore::new("https://qdrant.internal:6334", Some("k".to_string()), 64, false)
                .is_ok()
        );
    }

    #[test]
    fn test_provenance_prefers_ebook_chapter() {
        let hit = payload_to_hit(
            &payload(&[
                ("content", "Sage"),
                ("ebook_chapter", "part_2"),
                ("spec", "Salvia - uses"),
            ]),
            0.9,
        )
        .unwrap();
        assert_eq!(hit.provenance, "part_2");
        assert_eq!(hit.content, "Sage");
        assert!((hit.score - 0.9).abs() < 1e-6);
    }

    #[test]
    fn test_provenance_falls_back_to_spec() {
        let hit = payload_to_hit(
            &payload(&[("content", "Sage"), ("spec", "Salvia - uses")]),
            0.85,
        )
        .unwrap();
        assert_eq!(hit.provenance, "Salvia - uses");
    }

    #[test]
    fn test_provenance_may_be_absent() {
        let hit = payload_to_hit(&payload(&[("content", "Thyme")]), 0.92).unwrap();
        assert_eq!(hit.provenance, "");
    }

    #[test]
    fn test_missing_content_is_malformed() {
        let err = payload_to_hit(&payload(&[("ebook_chapter", "part_2")]), 0.9).unwrap_err();
        assert!(err.is_malformed());
    }

    #[test]
    fn test_non_string_content_is_malformed() {
        let mut fields = payload(&[("source", "web")]);
        fields.insert(
            "content".to_string(),
            Value {
                kind: Some(Kind::IntegerValue(7)),
            },
        );
        assert!(payload_to_hit(&fields, 0.9).unwrap_err().is_malformed());
    }
}
