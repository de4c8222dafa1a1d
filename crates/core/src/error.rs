//! Error types for herbwise.
//!
//! This module defines a unified error enum covering configuration, I/O,
//! prompt and serialization failures, plus the workflow taxonomy: an external
//! collaborator that is unreachable, one that answered outside its contract,
//! and a loop-budget invariant violation.

use std::fmt;
use thiserror::Error;

/// External services the question-answering loop depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collaborator {
    /// Text-completion backend, before a workflow step claims the call
    LanguageModel,
    /// Query embedding service
    Embedder,
    /// Vector similarity search
    KnowledgeStore,
    /// Per-passage relevance classifier
    RelevanceJudge,
    /// Search-recall question rewriter
    Rewriter,
    /// Live web search
    WebSearch,
    /// Web snippet content filter
    ContentFilter,
    /// Final answer synthesis
    AnswerGenerator,
}

impl Collaborator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LanguageModel => "language-model",
            Self::Embedder => "embedder",
            Self::KnowledgeStore => "knowledge-store",
            Self::RelevanceJudge => "relevance-judge",
            Self::Rewriter => "rewriter",
            Self::WebSearch => "web-search",
            Self::ContentFilter => "content-filter",
            Self::AnswerGenerator => "answer-generator",
        }
    }
}

impl fmt::Display for Collaborator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unified error type for herbwise.
///
/// All fallible functions return `Result<T, AppError>`.
/// We never panic; errors must be represented and propagated.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A collaborator could not be reached, answered with an error status,
    /// or did not answer within its call budget.
    #[error("{collaborator} unavailable: {reason}")]
    CollaboratorUnavailable {
        collaborator: Collaborator,
        reason: String,
    },

    /// A collaborator answered, but the answer violates its contract.
    #[error("{collaborator} returned a malformed response: {reason}")]
    CollaboratorMalformedResponse {
        collaborator: Collaborator,
        reason: String,
    },

    /// The loop controller was asked to route past its rewrite budget.
    /// This is a programming defect, never a recoverable condition.
    #[error("Rewrite budget exceeded: {0}")]
    BudgetExceeded(String),

    /// The session was cancelled at a step boundary or during a call.
    #[error("Session cancelled")]
    Cancelled,

    /// Prompt system errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl AppError {
    /// Shorthand for [`AppError::CollaboratorUnavailable`].
    pub fn unavailable(collaborator: Collaborator, reason: impl Into<String>) -> Self {
        Self::CollaboratorUnavailable {
            collaborator,
            reason: reason.into(),
        }
    }

    /// Shorthand for [`AppError::CollaboratorMalformedResponse`].
    pub fn malformed(collaborator: Collaborator, reason: impl Into<String>) -> Self {
        Self::CollaboratorMalformedResponse {
            collaborator,
            reason: reason.into(),
        }
    }

    /// Whether this error is a contract violation by a collaborator.
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::CollaboratorMalformedResponse { .. })
    }

    /// Rebind a collaborator error to a different collaborator.
    ///
    /// The LLM client reports failures as `LanguageModel`; each workflow
    /// step knows which role the call was playing.
    pub fn for_collaborator(self, role: Collaborator) -> Self {
        match self {
            Self::CollaboratorUnavailable { reason, .. } => Self::unavailable(role, reason),
            Self::CollaboratorMalformedResponse { reason, .. } => Self::malformed(role, reason),
            other => other,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collaborator_error_display() {
        let err = AppError::unavailable(Collaborator::KnowledgeStore, "connection refused");
        assert_eq!(
            err.to_string(),
            "knowledge-store unavailable: connection refused"
        );

        let err = AppError::malformed(Collaborator::RelevanceJudge, "answered 'maybe'");
        assert!(err.is_malformed());
        assert!(err.to_string().contains("relevance-judge"));
    }

    #[test]
    fn test_for_collaborator_rebinds_role() {
        let err = AppError::unavailable(Collaborator::LanguageModel, "timeout")
            .for_collaborator(Collaborator::Rewriter);

        match err {
            AppError::CollaboratorUnavailable {
                collaborator,
                reason,
            } => {
                assert_eq!(collaborator, Collaborator::Rewriter);
                assert_eq!(reason, "timeout");
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let untouched = AppError::Cancelled.for_collaborator(Collaborator::WebSearch);
        assert!(matches!(untouched, AppError::Cancelled));
    }
}
