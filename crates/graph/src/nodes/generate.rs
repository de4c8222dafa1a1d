use super::StepContext;
use crate::state::{SessionState, StepKind};
use herbwise_core::{AppResult, Collaborator};

/// Synthesize the final answer. Terminal step.
pub async fn generate(mut state: SessionState, ctx: &StepContext<'_>) -> AppResult<SessionState> {
    let answer = ctx
        .guard
        .call(
            Collaborator::AnswerGenerator,
            ctx.collaborators
                .generator
                .generate(&state.question, &state.documents),
        )
        .await?;

    tracing::info!(
        step = %StepKind::Generate,
        passages = state.documents.len(),
        "Generated answer"
    );

    state.generation = Some(answer);
    Ok(state.record(StepKind::Generate))
}
