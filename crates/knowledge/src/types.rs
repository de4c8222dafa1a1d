//! Evidence types shared by retrieval, web escalation and answering.

use serde::{Deserialize, Serialize};

/// A unit of evidence with provenance.
///
/// Passages come either from the knowledge store (source = encyclopedia
/// chapter) or from filtered web snippets (source = page URL). They are not
/// modified once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Passage {
    /// Evidence text
    pub content: String,

    /// Where the text came from
    pub source: String,
}

impl Passage {
    pub fn new(content: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            source: source.into(),
        }
    }
}

impl From<StoreHit> for Passage {
    fn from(hit: StoreHit) -> Self {
        Self {
            content: hit.content,
            source: hit.provenance,
        }
    }
}

/// A raw web search result, before content filtering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snippet {
    /// Page extract returned by the search engine
    pub content: String,

    /// Page URL
    pub url: String,
}

impl Snippet {
    pub fn new(content: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            url: url.into(),
        }
    }
}

/// A scored knowledge-store result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreHit {
    /// Stored passage text
    pub content: String,

    /// Chapter or document the passage was indexed from
    pub provenance: String,

    /// Similarity to the query (higher is closer)
    pub score: f32,
}
