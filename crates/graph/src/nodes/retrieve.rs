use super::StepContext;
use crate::state::{SessionState, StepKind};
use herbwise_core::{AppResult, Collaborator};

/// Replace the documents with fresh candidates for the current question.
pub async fn retrieve(mut state: SessionState, ctx: &StepContext<'_>) -> AppResult<SessionState> {
    let passages = ctx
        .guard
        .call(
            Collaborator::KnowledgeStore,
            ctx.collaborators
                .retriever
                .retrieve(&state.collection_name, &state.question),
        )
        .await?;

    tracing::info!(
        step = %StepKind::Retrieve,
        retrieved = passages.len(),
        "Retrieved candidate passages"
    );

    state.documents = passages;
    Ok(state.record(StepKind::Retrieve))
}
