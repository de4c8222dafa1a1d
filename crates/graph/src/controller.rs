//! Loop controller: decides what follows relevance filtering.

use herbwise_core::config::WorkflowConfig;
use herbwise_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Next step after the relevance filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    /// Enough relevant evidence: answer now
    Generate,
    /// Rewrite the question and retrieve again
    TransformQuery,
    /// Rewrite budget spent: supplement with web results, then answer
    WebEscalate,
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Generate => "generate",
            Self::TransformQuery => "transform_query",
            Self::WebEscalate => "web_escalate",
        })
    }
}

/// Thresholds of the retrieve/grade/rewrite loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopPolicy {
    /// Relevant passages needed, strictly exceeded, to answer directly
    pub relevance_threshold: usize,

    /// Rewrite cycles allowed before escalating to web search
    pub rewrite_ceiling: u32,
}

impl Default for LoopPolicy {
    fn default() -> Self {
        Self {
            relevance_threshold: 2,
            rewrite_ceiling: 2,
        }
    }
}

impl From<&WorkflowConfig> for LoopPolicy {
    fn from(config: &WorkflowConfig) -> Self {
        Self {
            relevance_threshold: config.relevance_threshold,
            rewrite_ceiling: config.rewrite_ceiling,
        }
    }
}

impl LoopPolicy {
    /// Route for the given filter result.
    ///
    /// `retry_count == rewrite_ceiling` is the single hand-off from rewriting
    /// to web escalation, so no cycle can both rewrite and escalate.
    /// A retry count past the ceiling means the driver looped without
    /// consulting the controller and is reported as `BudgetExceeded`.
    pub fn decide(&self, relevant_count: usize, retry_count: u32) -> AppResult<Route> {
        if retry_count > self.rewrite_ceiling {
            return Err(AppError::BudgetExceeded(format!(
                "retry count {} is past the rewrite ceiling {}",
                retry_count, self.rewrite_ceiling
            )));
        }

        let route = if relevant_count > self.relevance_threshold
            && retry_count < self.rewrite_ceiling
        {
            Route::Generate
        } else if retry_count == self.rewrite_ceiling {
            Route::WebEscalate
        } else {
            Route::TransformQuery
        };

        Ok(route)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enough_evidence_generates() {
        let policy = LoopPolicy::default();
        assert_eq!(policy.decide(3, 0).unwrap(), Route::Generate);
        assert_eq!(policy.decide(5, 1).unwrap(), Route::Generate);
    }

    #[test]
    fn test_threshold_is_strict() {
        let policy = LoopPolicy::default();
        assert_eq!(policy.decide(2, 0).unwrap(), Route::TransformQuery);
        assert_eq!(policy.decide(0, 1).unwrap(), Route::TransformQuery);
    }

    #[test]
    fn test_ceiling_escalates_even_with_evidence() {
        let policy = LoopPolicy::default();
        assert_eq!(policy.decide(0, 2).unwrap(), Route::WebEscalate);
        assert_eq!(policy.decide(7, 2).unwrap(), Route::WebEscalate);
    }

    #[test]
    fn test_past_ceiling_is_budget_exceeded() {
        let policy = LoopPolicy::default();
        assert!(matches!(policy.decide(0, 3), Err(AppError::BudgetExceeded(_))));
    }

    #[test]
    fn test_zero_ceiling_escalates_on_first_cycle() {
        let policy = LoopPolicy {
            relevance_threshold: 2,
            rewrite_ceiling: 0,
        };
        assert_eq!(policy.decide(10, 0).unwrap(), Route::WebEscalate);
    }

    #[test]
    fn test_every_pair_routes_exactly_once() {
        let policy = LoopPolicy::default();
        for retry in 0..=policy.rewrite_ceiling {
            for relevant in 0..8 {
                let route = policy.decide(relevant, retry).unwrap();
                let rewrite_allowed = retry < policy.rewrite_ceiling;
                match route {
                    Route::Generate => assert!(relevant > 2 && rewrite_allowed),
                    Route::TransformQuery => assert!(rewrite_allowed && relevant <= 2),
                    Route::WebEscalate => assert_eq!(retry, policy.rewrite_ceiling),
                }
            }
        }
    }

    #[test]
    fn test_policy_from_config() {
        let config = WorkflowConfig {
            relevance_threshold: 4,
            rewrite_ceiling: 1,
            ..Default::default()
        };
        let policy = LoopPolicy::from(&config);
        assert_eq!(policy.relevance_threshold, 4);
        assert_eq!(policy.rewrite_ceiling, 1);
    }
}
