use super::StepContext;
use crate::collaborators::Relevance;
use crate::state::{SessionState, StepKind};
use futures::{stream, StreamExt, TryStreamExt};
use herbwise_core::config::MalformedJudgmentPolicy;
use herbwise_core::{AppResult, Collaborator};

/// Narrow the documents to those the judge deems relevant.
///
/// Judgments run concurrently but are consumed in input order, so the
/// output is an ordered subsequence of the input. A malformed judgment is
/// resolved by the configured policy; any other judge failure aborts.
pub async fn grade(mut state: SessionState, ctx: &StepContext<'_>) -> AppResult<SessionState> {
    let question = state.question.as_str();
    let concurrency = ctx.grading_concurrency.max(1);

    let verdicts: Vec<bool> = stream::iter(state.documents.iter().enumerate())
        .map(|(index, passage)| async move {
            let judgment = ctx
                .guard
                .call(
                    Collaborator::RelevanceJudge,
                    ctx.collaborators.judge.classify(question, passage),
                )
                .await;

            match judgment {
                Ok(Relevance::Yes) => Ok(true),
                Ok(Relevance::No) => Ok(false),
                Err(e) if e.is_malformed() => {
                    let keep = ctx.malformed_judgment == MalformedJudgmentPolicy::Include;
                    tracing::warn!(passage = index, keep, "Malformed relevance judgment: {}", e);
                    Ok(keep)
                }
                Err(e) => Err(e),
            }
        })
        .buffered(concurrency)
        .try_collect()
        .await?;

    let before = state.documents.len();
    state.documents = std::mem::take(&mut state.documents)
        .into_iter()
        .zip(verdicts)
        .filter_map(|(passage, keep)| keep.then_some(passage))
        .collect();

    tracing::info!(
        step = %StepKind::Grade,
        relevant = state.documents.len(),
        graded = before,
        "Graded passages"
    );

    Ok(state.record(StepKind::Grade))
}
