// src/core/gate.rs — Plan policy and the stop/revise decision

use super::types::{GateDecision, Plan, StopReason};

/// Threshold and revision budget a plan grants.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlanPolicy {
    pub threshold: f64,
    pub max_iterations: u32,
}

pub const BASIC_THRESHOLD: f64 = 7.0;
pub const PREMIUM_THRESHOLD: f64 = 9.0;
pub const BASIC_ITERATIONS: u32 = 2;
pub const PREMIUM_ITERATIONS: u32 = 4;

/// The fixed policy table.
pub fn policy_for(plan: Plan) -> PlanPolicy {
    match plan {
        Plan::Free => PlanPolicy {
            threshold: f64::INFINITY,
            max_iterations: 0,
        },
        Plan::Basic => PlanPolicy {
            threshold: BASIC_THRESHOLD,
            max_iterations: BASIC_ITERATIONS,
        },
        Plan::Premium => PlanPolicy {
            threshold: PREMIUM_THRESHOLD,
            max_iterations: PREMIUM_ITERATIONS,
        },
    }
}

/// Apply caller overrides on top of the plan table.
///
/// The free tier never revises, so a cap override there is dropped.
pub fn resolve_policy(
    plan: Plan,
    threshold: Option<f64>,
    max_iterations: Option<u32>,
) -> PlanPolicy {
    let base = policy_for(plan);
    let max_iterations = match (plan.allows_revision(), max_iterations) {
        (true, Some(n)) => n,
        (false, Some(n)) if n > 0 => {
            tracing::warn!(plan = %plan, requested = n, "Plan does not allow revisions, ignoring cap");
            0
        }
        _ => base.max_iterations,
    };

    PlanPolicy {
        threshold: threshold.unwrap_or(base.threshold),
        max_iterations,
    }
}

/// Whether the essay is still below the bar on a plan that could fix it.
pub fn needs_improvement(avg_score: f64, threshold: f64, plan: Plan) -> bool {
    avg_score < threshold && plan.allows_revision()
}

/// Quality is checked before budget: a passing score always stops with `QualityMet`.
pub fn decide(
    avg_score: f64,
    threshold: f64,
    iteration_count: u32,
    max_iterations: u32,
) -> GateDecision {
    let decision = if avg_score >= threshold {
        GateDecision::Stop(StopReason::QualityMet)
    } else if iteration_count >= max_iterations {
        GateDecision::Stop(StopReason::BudgetExhausted)
    } else {
        GateDecision::Revise
    };

    tracing::info!(
        avg_score,
        threshold,
        iteration_count,
        max_iterations,
        "Gate: {}",
        decision
    );

    decision
}

#[cfg(test)]
mod tests {
    use super::*;

    // ─── policy table ───────────────────────────────────────────

    #[test]
    fn test_policy_table() {
        let free = policy_for(Plan::Free);
        assert!(free.threshold.is_infinite());
        assert_eq!(free.max_iterations, 0);
        assert_eq!(
            policy_for(Plan::Basic),
            PlanPolicy {
                threshold: 7.0,
                max_iterations: 2
            }
        );
        assert_eq!(
            policy_for(Plan::Premium),
            PlanPolicy {
                threshold: 9.0,
                max_iterations: 4
            }
        );
    }

    #[test]
    fn test_resolve_policy_overrides() {
        let p = resolve_policy(Plan::Basic, Some(6.5), Some(5));
        assert_eq!(p.threshold, 6.5);
        assert_eq!(p.max_iterations, 5);

        let p = resolve_policy(Plan::Premium, None, Some(0));
        assert_eq!(p.threshold, 9.0);
        assert_eq!(p.max_iterations, 0);
    }

    #[test]
    fn test_resolve_policy_free_never_revises() {
        let p = resolve_policy(Plan::Free, Some(5.0), Some(3));
        assert_eq!(p.threshold, 5.0);
        assert_eq!(p.max_iterations, 0);
    }

    // ─── needs_improvement ──────────────────────────────────────

    #[test]
    fn test_needs_improvement_free_always_false() {
        for score in [0.0, 3.3, 9.9, 10.0] {
            assert!(!needs_improvement(score, f64::INFINITY, Plan::Free));
            assert!(!needs_improvement(score, 5.0, Plan::Free));
        }
    }

    #[test]
    fn test_needs_improvement_paid_plans() {
        assert!(needs_improvement(6.9, 7.0, Plan::Basic));
        assert!(!needs_improvement(7.0, 7.0, Plan::Basic));
        assert!(needs_improvement(8.0, 9.0, Plan::Premium));
        assert!(!needs_improvement(9.5, 9.0, Plan::Premium));
    }

    // ─── decide ─────────────────────────────────────────────────

    #[test]
    fn test_decide_quality_beats_budget() {
        // Quality met even though the budget is also spent.
        assert_eq!(decide(7.0, 7.0, 2, 2), GateDecision::Stop(StopReason::QualityMet));
        assert_eq!(decide(9.5, 9.0, 10, 4), GateDecision::Stop(StopReason::QualityMet));
        assert_eq!(decide(8.0, 7.0, 0, 0), GateDecision::Stop(StopReason::QualityMet));
    }

    #[test]
    fn test_decide_budget_exhausted() {
        assert_eq!(
            decide(5.0, 7.0, 2, 2),
            GateDecision::Stop(StopReason::BudgetExhausted)
        );
        assert_eq!(
            decide(5.0, 7.0, 3, 2),
            GateDecision::Stop(StopReason::BudgetExhausted)
        );
        assert_eq!(
            decide(9.9, f64::INFINITY, 0, 0),
            GateDecision::Stop(StopReason::BudgetExhausted)
        );
    }

    #[test]
    fn test_decide_revise() {
        assert_eq!(decide(5.0, 7.0, 0, 2), GateDecision::Revise);
        assert_eq!(decide(6.0, 9.0, 3, 4), GateDecision::Revise);
    }

    #[test]
    fn test_decide_exhaustive_grid() {
        for count in 0..6u32 {
            for max in 0..6u32 {
                for (avg, threshold) in [(4.0, 7.0), (7.0, 7.0), (9.5, 9.0), (6.0, 9.0)] {
                    let d = decide(avg, threshold, count, max);
                    if avg >= threshold {
                        assert_eq!(d, GateDecision::Stop(StopReason::QualityMet));
                    } else if count >= max {
                        assert_eq!(d, GateDecision::Stop(StopReason::BudgetExhausted));
                    } else {
                        assert_eq!(d, GateDecision::Revise);
                    }
                }
            }
        }
    }
}
