//! Corrective retrieval workflow for herbwise.
//!
//! Answers a question from the herbal encyclopedia knowledge base:
//! retrieve candidates, keep the relevant ones, rewrite the question while
//! evidence is thin, fall back to web search once the rewrite budget is
//! spent, and synthesize an answer from whatever survived.

pub mod chains;
pub mod collaborators;
pub mod controller;
pub mod guard;
pub mod nodes;
pub mod state;
pub mod workflow;

#[cfg(test)]
mod tests;

pub use chains::{LlmChain, LlmCollaborators};
pub use collaborators::{
    AnswerGenerator, Collaborators, ContentFilter, QueryRewriter, Relevance, RelevanceJudge,
};
pub use controller::{LoopPolicy, Route};
pub use guard::CallGuard;
pub use state::{SessionOutcome, SessionRequest, SessionState, StepKind, StepRecord};
pub use workflow::{Workflow, WorkflowOptions};
