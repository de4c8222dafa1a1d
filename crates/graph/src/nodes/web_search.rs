use super::StepContext;
use crate::state::{SessionState, StepKind};
use herbwise_core::{AppResult, Collaborator};
use herbwise_knowledge::Passage;

/// Fetch raw web results for the current question.
pub async fn web_search(mut state: SessionState, ctx: &StepContext<'_>) -> AppResult<SessionState> {
    let snippets = ctx
        .guard
        .call(
            Collaborator::WebSearch,
            ctx.collaborators.web_search.search(&state.question),
        )
        .await?;

    tracing::info!(step = %StepKind::WebSearch, results = snippets.len(), "Searched the web");

    state.web_search_docs = snippets;
    Ok(state.record(StepKind::WebSearch))
}

/// Filter each web result down to what answers the question and append it
/// to the documents, in result order.
pub async fn revise(mut state: SessionState, ctx: &StepContext<'_>) -> AppResult<SessionState> {
    let snippets = std::mem::take(&mut state.web_search_docs);

    for snippet in snippets {
        let filtered = ctx
            .guard
            .call(
                Collaborator::ContentFilter,
                ctx.collaborators
                    .content_filter
                    .filter(&state.question, &snippet.content),
            )
            .await?;

        tracing::debug!(url = %snippet.url, "Filtered web content");
        state.documents.push(Passage::new(filtered, snippet.url));
    }

    tracing::info!(step = %StepKind::Revise, documents = state.documents.len(), "Appended web evidence");
    Ok(state.record(StepKind::Revise))
}
