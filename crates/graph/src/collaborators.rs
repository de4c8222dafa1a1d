//! External collaborators the workflow steps call.
//!
//! Retrieval and web search live in `herbwise-knowledge`; the generative
//! roles are defined here and implemented over an LLM in [`crate::chains`].

use herbwise_core::AppResult;
use herbwise_knowledge::{Passage, Retriever, WebSearch};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Binary relevance judgment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Relevance {
    Yes,
    No,
}

/// Decides whether one passage is relevant to a question.
///
/// An answer that is neither yes nor no must be reported as
/// `CollaboratorMalformedResponse`.
#[async_trait::async_trait]
pub trait RelevanceJudge: Send + Sync {
    async fn classify(&self, question: &str, passage: &Passage) -> AppResult<Relevance>;
}

/// Reformulates a question for better search recall.
#[async_trait::async_trait]
pub trait QueryRewriter: Send + Sync {
    async fn rewrite(&self, question: &str) -> AppResult<String>;
}

/// Extracts the question-relevant part of a web page extract.
#[async_trait::async_trait]
pub trait ContentFilter: Send + Sync {
    async fn filter(&self, question: &str, raw_text: &str) -> AppResult<String>;
}

/// Writes the final answer from the accumulated passages.
#[async_trait::async_trait]
pub trait AnswerGenerator: Send + Sync {
    async fn generate(&self, question: &str, passages: &[Passage]) -> AppResult<String>;
}

/// Everything a session calls out to.
#[derive(Clone)]
pub struct Collaborators {
    pub retriever: Arc<dyn Retriever>,
    pub judge: Arc<dyn RelevanceJudge>,
    pub rewriter: Arc<dyn QueryRewriter>,
    pub web_search: Arc<dyn WebSearch>,
    pub content_filter: Arc<dyn ContentFilter>,
    pub generator: Arc<dyn AnswerGenerator>,
}
