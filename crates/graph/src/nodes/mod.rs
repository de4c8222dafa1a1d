//! Workflow steps.
//!
//! Every step has the shape `async fn(SessionState, &StepContext) ->
//! AppResult<SessionState>`: it consumes the state, makes its collaborator
//! calls through the session's [`CallGuard`], and returns the next state.

mod generate;
mod grade;
mod retrieve;
mod transform;
mod web_search;

pub use generate::generate;
pub use grade::grade;
pub use retrieve::retrieve;
pub use transform::transform_query;
pub use web_search::{revise, web_search};

use crate::collaborators::Collaborators;
use crate::guard::CallGuard;
use herbwise_core::config::MalformedJudgmentPolicy;

/// What a step may use besides the state.
pub struct StepContext<'a> {
    pub collaborators: &'a Collaborators,
    pub guard: CallGuard,

    /// Relevance judgments in flight at once
    pub grading_concurrency: usize,

    pub malformed_judgment: MalformedJudgmentPolicy,
}
