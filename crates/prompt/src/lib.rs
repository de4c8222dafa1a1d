//! Prompt system for herbwise.
//!
//! This crate provides structured prompt management with:
//! - YAML-based prompt definitions, compiled in and overridable per workspace
//! - Handlebars template rendering for system and user messages
//! - Sampling settings carried alongside each prompt

pub mod builder;
pub mod loader;
pub mod types;

/// Identifiers of the prompts the workflow renders.
pub mod ids {
    /// Binary relevance judgment of one passage
    pub const GRADE: &str = "herbwise.grade";
    /// Search-recall rewrite of the question
    pub const REWRITE: &str = "herbwise.rewrite";
    /// Extraction of question-relevant content from a web snippet
    pub const REVISE: &str = "herbwise.revise";
    /// Final answer from the accumulated passages
    pub const ANSWER: &str = "herbwise.answer";
}

/// Fixed phrase the answer prompt asks for when the passages do not
/// support an answer.
pub const NOT_FOUND_ANSWER: &str = "Sorry, I don't know how to help with that question.";

// Re-export main types
pub use builder::build_prompt;
pub use loader::{list_prompts, load_prompt, PromptOrigin, PromptSet, PromptSummary};
pub use types::{
    BuiltPrompt, BuiltPromptMetadata, OutputFormat, PromptBehavior, PromptDefinition,
    PromptOutputSpec,
};
