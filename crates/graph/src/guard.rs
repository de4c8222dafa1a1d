//! Per-call timeout and cancellation.

use herbwise_core::{AppError, AppResult, Collaborator};
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Wraps every collaborator call of one session.
///
/// A call that outlives `timeout` fails with `CollaboratorUnavailable`; a
/// call in flight when the session is cancelled fails with `Cancelled`.
#[derive(Debug, Clone)]
pub struct CallGuard {
    timeout: Duration,
    cancel: CancellationToken,
}

impl CallGuard {
    pub fn new(timeout: Duration, cancel: CancellationToken) -> Self {
        Self { timeout, cancel }
    }

    /// Fail with `Cancelled` if the session has been cancelled.
    pub fn checkpoint(&self) -> AppResult<()> {
        if self.cancel.is_cancelled() {
            return Err(AppError::Cancelled);
        }
        Ok(())
    }

    /// Run one collaborator call under the session's budget.
    pub async fn call<T, F>(&self, collaborator: Collaborator, call: F) -> AppResult<T>
    where
        F: Future<Output = AppResult<T>>,
    {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(AppError::Cancelled),
            result = tokio::time::timeout(self.timeout, call) => match result {
                Ok(outcome) => outcome,
                Err(_) => {
                    tracing::warn!(%collaborator, "Call timed out after {:?}", self.timeout);
                    Err(AppError::unavailable(
                        collaborator,
                        format!("no response within {}s", self.timeout.as_secs_f32()),
                    ))
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guard(timeout_ms: u64) -> (CallGuard, CancellationToken) {
        let token = CancellationToken::new();
        (
            CallGuard::new(Duration::from_millis(timeout_ms), token.clone()),
            token,
        )
    }

    #[tokio::test]
    async fn test_call_passes_result_through() {
        let (guard, _) = guard(1_000);
        let value = guard
            .call(Collaborator::Rewriter, async { Ok::<_, AppError>(7) })
            .await
            .unwrap();
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn test_timeout_is_unavailable() {
        let (guard, _) = guard(20);
        let err = guard
            .call(Collaborator::WebSearch, async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok::<_, AppError>(())
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            AppError::CollaboratorUnavailable {
                collaborator: Collaborator::WebSearch,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_cancel_interrupts_call() {
        let (guard, token) = guard(10_000);
        let canceller = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            token.cancel();
        });

        let err = guard
            .call(Collaborator::AnswerGenerator, async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok::<_, AppError>(())
            })
            .await
            .unwrap_err();

        canceller.await.unwrap();
        assert!(matches!(err, AppError::Cancelled));
        assert!(matches!(guard.checkpoint(), Err(AppError::Cancelled)));
    }
}
