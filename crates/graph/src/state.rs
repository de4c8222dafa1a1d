//! Session state threaded through the workflow steps.
//!
//! A [`SessionState`] is created per question, moved by value into each
//! step, and returned (modified) by it. No step keeps a reference to it.

use chrono::{DateTime, Utc};
use herbwise_knowledge::{Passage, Snippet};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A question to answer against one knowledge-store collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRequest {
    pub question: String,
    pub collection_name: String,
}

impl SessionRequest {
    pub fn new(question: impl Into<String>, collection_name: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            collection_name: collection_name.into(),
        }
    }
}

/// Workflow steps, as recorded in the trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    Retrieve,
    Grade,
    TransformQuery,
    WebSearch,
    Revise,
    Generate,
}

impl StepKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Retrieve => "retrieve",
            Self::Grade => "grade",
            Self::TransformQuery => "transform_query",
            Self::WebSearch => "web_search",
            Self::Revise => "revise",
            Self::Generate => "generate",
        }
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One completed step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepRecord {
    pub step: StepKind,

    /// Question as it stood after the step
    pub question: String,

    /// Number of passages held after the step
    pub document_count: usize,

    pub completed_at: DateTime<Utc>,
}

/// The workflow's single record of progress.
#[derive(Debug, Clone)]
pub struct SessionState {
    /// Question the session started from
    pub original_question: String,

    /// Current, possibly rewritten, question
    pub question: String,

    /// Knowledge-store partition; fixed for the session
    pub collection_name: String,

    /// Current evidence
    pub documents: Vec<Passage>,

    /// Raw web results awaiting content filtering
    pub web_search_docs: Vec<Snippet>,

    /// Rewrite cycles performed so far
    pub retry_count: u32,

    /// Final answer; set once, by the generate step
    pub generation: Option<String>,

    pub trace: Vec<StepRecord>,
}

impl SessionState {
    pub fn new(request: SessionRequest) -> Self {
        Self {
            original_question: request.question.clone(),
            question: request.question,
            collection_name: request.collection_name,
            documents: Vec::new(),
            web_search_docs: Vec::new(),
            retry_count: 0,
            generation: None,
            trace: Vec::new(),
        }
    }

    /// Append a trace record for a finished step.
    pub fn record(mut self, step: StepKind) -> Self {
        self.trace.push(StepRecord {
            step,
            question: self.question.clone(),
            document_count: self.documents.len(),
            completed_at: Utc::now(),
        });
        self
    }

    /// How many times `step` has run.
    pub fn count(&self, step: StepKind) -> usize {
        self.trace.iter().filter(|r| r.step == step).count()
    }
}

/// Result of a completed session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionOutcome {
    pub session_id: String,
    pub generation: String,
    pub documents: Vec<Passage>,
    pub original_question: String,

    /// Final question, after any rewrites
    pub question: String,
    pub retry_count: u32,
    pub web_escalated: bool,
    pub trace: Vec<StepRecord>,
}

impl SessionOutcome {
    /// Build the outcome from a state that has been through the generate step.
    ///
    /// Returns `None` if no answer was generated.
    pub fn from_state(session_id: impl Into<String>, state: SessionState) -> Option<Self> {
        let web_escalated = state.count(StepKind::WebSearch) > 0;
        let generation = state.generation?;

        Some(Self {
            session_id: session_id.into(),
            generation,
            documents: state.documents,
            original_question: state.original_question,
            question: state.question,
            retry_count: state.retry_count,
            web_escalated,
            trace: state.trace,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_starts_empty() {
        let state = SessionState::new(SessionRequest::new("What is nettle?", "herbs"));
        assert_eq!(state.question, "What is nettle?");
        assert_eq!(state.original_question, "What is nettle?");
        assert_eq!(state.collection_name, "herbs");
        assert_eq!(state.retry_count, 0);
        assert!(state.documents.is_empty());
        assert!(state.generation.is_none());
    }

    #[test]
    fn test_record_captures_step_snapshot() {
        let mut state = SessionState::new(SessionRequest::new("q", "herbs"));
        state.documents.push(Passage::new("Nettle is rich in iron.", "part_4"));

        let state = state.record(StepKind::Retrieve).record(StepKind::Grade);
        assert_eq!(state.trace.len(), 2);
        assert_eq!(state.trace[0].step, StepKind::Retrieve);
        assert_eq!(state.trace[1].document_count, 1);
        assert_eq!(state.count(StepKind::Retrieve), 1);
    }

    #[test]
    fn test_outcome_requires_generation() {
        let state = SessionState::new(SessionRequest::new("q", "herbs"));
        assert!(SessionOutcome::from_state("s1", state).is_none());
    }

    #[test]
    fn test_outcome_reports_web_escalation() {
        let mut state = SessionState::new(SessionRequest::new("q", "herbs"))
            .record(StepKind::WebSearch);
        state.generation = Some("answer".to_string());

        let outcome = SessionOutcome::from_state("s1", state).unwrap();
        assert!(outcome.web_escalated);
        assert_eq!(outcome.generation, "answer");
    }
}
