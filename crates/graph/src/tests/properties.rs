use super::stubs::*;
use crate::collaborators::Relevance;
use crate::controller::LoopPolicy;
use crate::state::{SessionRequest, StepKind};
use crate::workflow::WorkflowOptions;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[tokio::test]
async fn test_termination_bound_with_adversarial_judge() {
    for ceiling in 0..=3u32 {
        let harness = Harness::new(
            ScriptedRetriever::always(passages("kb", 6)),
            ScriptedJudge::all(Relevance::No),
            StubWebSearch::returning(web_results()),
        );
        let options = WorkflowOptions {
            policy: LoopPolicy {
                relevance_threshold: 2,
                rewrite_ceiling: ceiling,
            },
            ..Default::default()
        };

        let outcome = harness
            .workflow_with(options)
            .run(SessionRequest::new("q", "herbs"), CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(harness.retriever.calls(), ceiling as usize + 1);
        assert_eq!(harness.web.calls(), 1);
        assert_eq!(outcome.retry_count, ceiling);
        assert_eq!(harness.generator.calls(), 1);
    }
}

#[tokio::test]
async fn test_retry_count_increases_by_one_per_rewrite() {
    let harness = Harness::new(
        ScriptedRetriever::always(passages("kb", 1)),
        ScriptedJudge::all(Relevance::Yes),
        StubWebSearch::returning(Vec::new()),
    );

    let outcome = harness
        .workflow()
        .run(SessionRequest::new("q", "herbs"), CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(
        outcome.retry_count as usize,
        outcome.trace.iter().filter(|r| r.step == StepKind::TransformQuery).count()
    );

    let questions: Vec<&str> = outcome
        .trace
        .iter()
        .filter(|r| r.step == StepKind::TransformQuery)
        .map(|r| r.question.as_str())
        .collect();
    assert_eq!(questions, ["q [rewrite 1]", "q [rewrite 1] [rewrite 2]"]);
}

#[tokio::test]
async fn test_grading_preserves_input_order_under_concurrency() {
    // Earlier passages take longer, so judgments complete in reverse order
    let harness = Harness::new(
        ScriptedRetriever::always(passages("kb", 8)),
        ScriptedJudge::new(|p| {
            let index: usize = p.source.trim_start_matches("kb-").parse().unwrap();
            Ok(if index % 3 == 1 {
                Relevance::No
            } else {
                Relevance::Yes
            })
        })
        .with_delay(|p| {
            let index: u64 = p.source.trim_start_matches("kb-").parse().unwrap();
            Duration::from_millis(40 - index * 5)
        }),
        StubWebSearch::returning(web_results()),
    );
    let options = WorkflowOptions {
        grading_concurrency: 8,
        ..Default::default()
    };

    let outcome = harness
        .workflow_with(options)
        .run(SessionRequest::new("q", "herbs"), CancellationToken::new())
        .await
        .unwrap();

    let sources: Vec<&str> = outcome.documents.iter().map(|p| p.source.as_str()).collect();
    assert_eq!(sources, ["kb-0", "kb-2", "kb-3", "kb-5", "kb-6"]);
}

#[tokio::test]
async fn test_synthesis_is_idempotent_for_identical_input() {
    let run = || async {
        let harness = Harness::new(
            ScriptedRetriever::always(passages("kb", 4)),
            ScriptedJudge::all(Relevance::Yes),
            StubWebSearch::returning(web_results()),
        );
        harness
            .workflow()
            .run(SessionRequest::new("Is sage antiseptic?", "herbs"), CancellationToken::new())
            .await
            .unwrap()
    };

    let first = run().await;
    let second = run().await;

    assert_eq!(first.generation, second.generation);
    assert_eq!(first.documents, second.documents);
    assert_ne!(first.session_id, second.session_id);
}

#[tokio::test]
async fn test_web_escalation_appends_without_replacing() {
    let harness = Harness::new(
        ScriptedRetriever::always(passages("kb", 2)),
        ScriptedJudge::all(Relevance::Yes),
        StubWebSearch::returning(web_results()),
    );

    let outcome = harness
        .workflow()
        .run(SessionRequest::new("q", "herbs"), CancellationToken::new())
        .await
        .unwrap();

    // 2 relevant never exceeds the threshold, so the budget runs out
    assert!(outcome.web_escalated);
    assert_eq!(outcome.documents.len(), 4);
    assert_eq!(outcome.documents[0].source, "kb-0");

    let seen = harness.generator.seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].1, outcome.documents);
}
