//! Workflow driver.
//!
//! Threads one [`SessionState`] through retrieve → grade → decide, looping
//! through query rewrites until the controller routes to generation or web
//! escalation. Every session ends at the generate step or with an error.

use crate::collaborators::Collaborators;
use crate::controller::{LoopPolicy, Route};
use crate::guard::CallGuard;
use crate::nodes::{self, StepContext};
use crate::state::{SessionOutcome, SessionRequest, SessionState};
use herbwise_core::config::{MalformedJudgmentPolicy, WorkflowConfig};
use herbwise_core::{AppError, AppResult};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use uuid::Uuid;

/// Runtime settings of the driver.
#[derive(Debug, Clone)]
pub struct WorkflowOptions {
    pub policy: LoopPolicy,
    pub call_timeout: Duration,
    pub grading_concurrency: usize,
    pub malformed_judgment: MalformedJudgmentPolicy,
}

impl Default for WorkflowOptions {
    fn default() -> Self {
        Self::from(&WorkflowConfig::default())
    }
}

impl From<&WorkflowConfig> for WorkflowOptions {
    fn from(config: &WorkflowConfig) -> Self {
        Self {
            policy: LoopPolicy::from(config),
            call_timeout: Duration::from_secs(config.call_timeout_secs),
            grading_concurrency: config.grading_concurrency,
            malformed_judgment: config.malformed_judgment,
        }
    }
}

/// Answers questions with the corrective retrieval loop.
///
/// A `Workflow` holds no per-session data; one instance can serve many
/// sessions concurrently.
#[derive(Clone)]
pub struct Workflow {
    collaborators: Collaborators,
    options: WorkflowOptions,
}

impl Workflow {
    pub fn new(collaborators: Collaborators, options: WorkflowOptions) -> Self {
        Self {
            collaborators,
            options,
        }
    }

    pub fn options(&self) -> &WorkflowOptions {
        &self.options
    }

    fn context(&self, cancel: CancellationToken) -> StepContext<'_> {
        StepContext {
            collaborators: &self.collaborators,
            guard: CallGuard::new(self.options.call_timeout, cancel),
            grading_concurrency: self.options.grading_concurrency,
            malformed_judgment: self.options.malformed_judgment,
        }
    }

    /// Run a full session: retrieve, grade, and rewrite or escalate as the
    /// controller decides, then answer.
    pub async fn run(
        &self,
        request: SessionRequest,
        cancel: CancellationToken,
    ) -> AppResult<SessionOutcome> {
        let session_id = Uuid::new_v4().to_string();
        let span = tracing::info_span!("session", id = %session_id);

        async {
            tracing::info!(collection = %request.collection_name, "Starting session");
            let ctx = self.context(cancel);
            let state = self.drive(SessionState::new(request), &ctx).await?;
            finish(session_id.clone(), state)
        }
        .instrument(span)
        .await
    }

    /// Run a single retrieve-then-answer pass with no grading, rewriting or
    /// web escalation.
    pub async fn run_direct(
        &self,
        request: SessionRequest,
        cancel: CancellationToken,
    ) -> AppResult<SessionOutcome> {
        let session_id = Uuid::new_v4().to_string();
        let span = tracing::info_span!("session", id = %session_id, mode = "direct");

        async {
            let ctx = self.context(cancel);
            let mut state = SessionState::new(request);

            ctx.guard.checkpoint()?;
            state = nodes::retrieve(state, &ctx).await?;
            ctx.guard.checkpoint()?;
            state = nodes::generate(state, &ctx).await?;

            finish(session_id.clone(), state)
        }
        .instrument(span)
        .await
    }

    async fn drive(&self, mut state: SessionState, ctx: &StepContext<'_>) -> AppResult<SessionState> {
        let policy = self.options.policy;

        loop {
            ctx.guard.checkpoint()?;
            state = nodes::retrieve(state, ctx).await?;

            ctx.guard.checkpoint()?;
            state = nodes::grade(state, ctx).await?;

            let route = policy.decide(state.documents.len(), state.retry_count)?;
            tracing::info!(
                %route,
                relevant = state.documents.len(),
                retry = state.retry_count,
                "Routing"
            );

            match route {
                Route::Generate => break,
                Route::TransformQuery => {
                    ctx.guard.checkpoint()?;
                    state = nodes::transform_query(state, ctx).await?;
                }
                Route::WebEscalate => {
                    ctx.guard.checkpoint()?;
                    state = nodes::web_search(state, ctx).await?;
                    ctx.guard.checkpoint()?;
                    state = nodes::revise(state, ctx).await?;
                    break;
                }
            }
        }

        ctx.guard.checkpoint()?;
        nodes::generate(state, ctx).await
    }
}

fn finish(session_id: String, state: SessionState) -> AppResult<SessionOutcome> {
    let steps = state.trace.len();
    let outcome = SessionOutcome::from_state(session_id, state)
        .ok_or_else(|| AppError::Other("session ended without an answer".to_string()))?;

    tracing::info!(
        steps,
        retry = outcome.retry_count,
        web_escalated = outcome.web_escalated,
        "Session complete"
    );
    Ok(outcome)
}
