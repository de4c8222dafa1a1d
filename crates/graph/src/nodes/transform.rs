use super::StepContext;
use crate::state::{SessionState, StepKind};
use herbwise_core::{AppResult, Collaborator};

/// Rewrite the question and count the cycle. Documents are left untouched.
pub async fn transform_query(
    mut state: SessionState,
    ctx: &StepContext<'_>,
) -> AppResult<SessionState> {
    let rewritten = ctx
        .guard
        .call(
            Collaborator::Rewriter,
            ctx.collaborators.rewriter.rewrite(&state.question),
        )
        .await?;

    tracing::info!(step = %StepKind::TransformQuery, retry = state.retry_count + 1, "Rewrote question");
    tracing::debug!("Rewritten question: {}", rewritten);

    state.question = rewritten;
    state.retry_count += 1;
    Ok(state.record(StepKind::TransformQuery))
}
