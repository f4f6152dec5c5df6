// src/core/types.rs — Core domain types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::gate::{self, PlanPolicy};
use crate::infra::errors::RedraftError;

/// Upper bound on an explicit `max_iterations` override.
pub const MAX_ITERATIONS_LIMIT: u32 = 10;
/// Scores (and explicit thresholds) live on a 0–10 scale.
pub const SCORE_MAX: f64 = 10.0;

/// Subscription tier selecting the default threshold and revision budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    #[default]
    Free,
    Basic,
    Premium,
}

impl Plan {
    /// Whether this plan ever permits a rewrite.
    pub fn allows_revision(self) -> bool {
        matches!(self, Plan::Basic | Plan::Premium)
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Plan::Free => write!(f, "free"),
            Plan::Basic => write!(f, "basic"),
            Plan::Premium => write!(f, "premium"),
        }
    }
}

impl FromStr for Plan {
    type Err = RedraftError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "free" => Ok(Plan::Free),
            "basic" => Ok(Plan::Basic),
            "premium" => Ok(Plan::Premium),
            other => Err(RedraftError::InvalidInput(format!(
                "unknown plan '{other}' (expected free, basic or premium)"
            ))),
        }
    }
}

/// One of the three independent scoring rubrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    Clarity,
    Analysis,
    Language,
}

impl Dimension {
    /// Scoring order within a cycle.
    pub const ALL: [Dimension; 3] = [Dimension::Clarity, Dimension::Analysis, Dimension::Language];

    pub fn as_str(self) -> &'static str {
        match self {
            Dimension::Clarity => "clarity",
            Dimension::Analysis => "analysis",
            Dimension::Language => "language",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A judge's verdict on one dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionFeedback {
    pub feedback: String,
    pub score: f64,
}

/// Results of one cycle's three scoring calls, each bound to its own slot.
#[derive(Debug, Clone)]
pub struct CycleScores {
    pub clarity: DimensionFeedback,
    pub analysis: DimensionFeedback,
    pub language: DimensionFeedback,
}

/// Inbound request from a front end.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EssayRequest {
    pub essay: String,
    #[serde(default)]
    pub plan: Plan,
    #[serde(default)]
    pub threshold: Option<f64>,
    #[serde(default)]
    pub max_iterations: Option<u32>,
}

impl EssayRequest {
    pub fn new(essay: impl Into<String>, plan: Plan) -> Self {
        Self {
            essay: essay.into(),
            plan,
            threshold: None,
            max_iterations: None,
        }
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = Some(threshold);
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = Some(max_iterations);
        self
    }
}

/// The single mutable record threaded through the refine loop.
#[derive(Debug, Clone, PartialEq)]
pub struct EssayState {
    pub essay: String,
    pub feedback_language: String,
    pub feedback_clarity: String,
    pub feedback_analysis: String,
    pub overall_feedback: String,
    pub scores: Vec<f64>,
    pub avg_score: f64,
    pub iteration_count: u32,
    pub max_iterations: u32,
    pub threshold: f64,
    pub plan: Plan,
    pub needs_improvement: bool,
}

impl EssayState {
    /// Validate a request and build the initial state. No generation happens here.
    pub fn from_request(request: &EssayRequest) -> Result<Self, RedraftError> {
        let essay = request.essay.trim();
        if essay.is_empty() {
            return Err(RedraftError::InvalidInput("essay is empty".into()));
        }

        if let Some(t) = request.threshold {
            if !t.is_finite() || !(0.0..=SCORE_MAX).contains(&t) {
                return Err(RedraftError::InvalidInput(format!(
                    "threshold {t} is outside 0-{SCORE_MAX}"
                )));
            }
        }
        if let Some(n) = request.max_iterations {
            if n > MAX_ITERATIONS_LIMIT {
                return Err(RedraftError::InvalidInput(format!(
                    "max_iterations {n} exceeds {MAX_ITERATIONS_LIMIT}"
                )));
            }
        }

        let PlanPolicy {
            threshold,
            max_iterations,
        } = gate::resolve_policy(request.plan, request.threshold, request.max_iterations);

        Ok(Self::new(essay, request.plan, threshold, max_iterations))
    }

    pub fn new(essay: impl Into<String>, plan: Plan, threshold: f64, max_iterations: u32) -> Self {
        Self {
            essay: essay.into(),
            feedback_language: String::new(),
            feedback_clarity: String::new(),
            feedback_analysis: String::new(),
            overall_feedback: String::new(),
            scores: Vec::new(),
            avg_score: 0.0,
            iteration_count: 0,
            max_iterations,
            threshold,
            plan,
            needs_improvement: false,
        }
    }

    /// Land one dimension's verdict in its named field and append its score.
    pub fn record(&mut self, dimension: Dimension, verdict: DimensionFeedback) {
        match dimension {
            Dimension::Clarity => self.feedback_clarity = verdict.feedback,
            Dimension::Analysis => self.feedback_analysis = verdict.feedback,
            Dimension::Language => self.feedback_language = verdict.feedback,
        }
        self.scores.push(verdict.score);
    }

    /// Merge a full cycle of scores in fixed dimension order.
    pub fn record_cycle(&mut self, cycle: CycleScores) {
        self.record(Dimension::Clarity, cycle.clarity);
        self.record(Dimension::Analysis, cycle.analysis);
        self.record(Dimension::Language, cycle.language);
    }

    /// Install a rewritten essay and clear everything scoped to the previous cycle.
    pub fn begin_revision(&mut self, essay: String) {
        self.essay = essay;
        self.feedback_language.clear();
        self.feedback_clarity.clear();
        self.feedback_analysis.clear();
        self.overall_feedback.clear();
        self.scores.clear();
        self.iteration_count += 1;
    }
}

/// Outcome of the gate after an aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GateDecision {
    Stop(StopReason),
    Revise,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    QualityMet,
    BudgetExhausted,
}

impl fmt::Display for GateDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GateDecision::Stop(StopReason::QualityMet) => write!(f, "stop (quality met)"),
            GateDecision::Stop(StopReason::BudgetExhausted) => write!(f, "stop (budget exhausted)"),
            GateDecision::Revise => write!(f, "revise"),
        }
    }
}

/// Terminal projection handed back to the front end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EssayReport {
    pub essay: String,
    pub avg_score: f64,
    pub overall_feedback: String,
    pub needs_improvement: bool,
    pub iteration_count: u32,
    pub plan: Plan,
    /// `None` when the plan's threshold is unbounded (free tier).
    pub threshold: Option<f64>,
    pub stop_reason: StopReason,
    pub tokens_used: u32,
}

impl EssayReport {
    pub fn from_state(state: EssayState, stop_reason: StopReason, tokens_used: u32) -> Self {
        Self {
            threshold: state.threshold.is_finite().then_some(state.threshold),
            essay: state.essay,
            avg_score: state.avg_score,
            overall_feedback: state.overall_feedback,
            needs_improvement: state.needs_improvement,
            iteration_count: state.iteration_count,
            plan: state.plan,
            stop_reason,
            tokens_used,
        }
    }
}

/// Real-time lifecycle notifications from the orchestrator.
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    CycleStart {
        cycle: u32,
        iteration_count: u32,
        max_iterations: u32,
    },
    DimensionScored {
        dimension: Dimension,
        score: f64,
        elapsed_ms: u64,
    },
    Aggregated {
        avg_score: f64,
        threshold: f64,
    },
    Decision {
        decision: GateDecision,
    },
    Revised {
        iteration_count: u32,
        essay_chars: usize,
    },
    Complete {
        avg_score: f64,
        iteration_count: u32,
        tokens_used: u32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn verdict(feedback: &str, score: f64) -> DimensionFeedback {
        DimensionFeedback {
            feedback: feedback.into(),
            score,
        }
    }

    // ─── Plan ───────────────────────────────────────────────────

    #[test]
    fn test_plan_parse() {
        assert_eq!("free".parse::<Plan>().unwrap(), Plan::Free);
        assert_eq!(" Basic ".parse::<Plan>().unwrap(), Plan::Basic);
        assert_eq!("PREMIUM".parse::<Plan>().unwrap(), Plan::Premium);
        assert!(matches!(
            "gold".parse::<Plan>(),
            Err(RedraftError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_plan_serde_lowercase() {
        assert_eq!(serde_json::to_string(&Plan::Premium).unwrap(), "\"premium\"");
        let p: Plan = serde_json::from_str("\"basic\"").unwrap();
        assert_eq!(p, Plan::Basic);
    }

    #[test]
    fn test_plan_allows_revision() {
        assert!(!Plan::Free.allows_revision());
        assert!(Plan::Basic.allows_revision());
        assert!(Plan::Premium.allows_revision());
    }

    // ─── EssayState construction ────────────────────────────────

    #[test]
    fn test_from_request_trims_and_zeroes() {
        let state = EssayState::from_request(&EssayRequest::new("  An essay.\n", Plan::Basic))
            .unwrap();
        assert_eq!(state.essay, "An essay.");
        assert!(state.scores.is_empty());
        assert_eq!(state.iteration_count, 0);
        assert_eq!(state.avg_score, 0.0);
        assert_eq!(state.threshold, 7.0);
        assert_eq!(state.max_iterations, 2);
        assert!(!state.needs_improvement);
    }

    #[test]
    fn test_from_request_rejects_blank_essay() {
        let err = EssayState::from_request(&EssayRequest::new(" \n\t ", Plan::Premium))
            .unwrap_err();
        assert!(matches!(err, RedraftError::InvalidInput(_)));
    }

    #[test]
    fn test_from_request_rejects_out_of_range_threshold() {
        for bad in [-0.1, 10.5, f64::NAN, f64::INFINITY] {
            let req = EssayRequest::new("Essay.", Plan::Basic).with_threshold(bad);
            assert!(
                matches!(
                    EssayState::from_request(&req),
                    Err(RedraftError::InvalidInput(_))
                ),
                "threshold {bad} should be rejected"
            );
        }
    }

    #[test]
    fn test_from_request_rejects_oversized_cap() {
        let req = EssayRequest::new("Essay.", Plan::Premium).with_max_iterations(11);
        assert!(matches!(
            EssayState::from_request(&req),
            Err(RedraftError::InvalidInput(_))
        ));
        let req = EssayRequest::new("Essay.", Plan::Premium).with_max_iterations(10);
        assert_eq!(EssayState::from_request(&req).unwrap().max_iterations, 10);
    }

    #[test]
    fn test_request_json_defaults() {
        let req: EssayRequest = serde_json::from_str(r#"{"essay":"Hi"}"#).unwrap();
        assert_eq!(req.plan, Plan::Free);
        assert!(req.threshold.is_none());
        assert!(req.max_iterations.is_none());
    }

    // ─── Cycle bookkeeping ──────────────────────────────────────

    #[test]
    fn test_record_cycle_fixed_order() {
        let mut state = EssayState::new("e", Plan::Basic, 7.0, 2);
        state.record_cycle(CycleScores {
            clarity: verdict("clear", 6.0),
            analysis: verdict("shallow", 4.0),
            language: verdict("fine", 8.0),
        });
        assert_eq!(state.scores, vec![6.0, 4.0, 8.0]);
        assert_eq!(state.feedback_clarity, "clear");
        assert_eq!(state.feedback_analysis, "shallow");
        assert_eq!(state.feedback_language, "fine");
    }

    #[test]
    fn test_begin_revision_resets_cycle_fields() {
        let mut state = EssayState::new("old", Plan::Premium, 9.0, 4);
        state.record_cycle(CycleScores {
            clarity: verdict("a", 5.0),
            analysis: verdict("b", 5.0),
            language: verdict("c", 5.0),
        });
        state.overall_feedback = "summary".into();
        state.avg_score = 5.0;

        state.begin_revision("new".into());

        assert_eq!(state.essay, "new");
        assert!(state.scores.is_empty());
        assert!(state.feedback_clarity.is_empty());
        assert!(state.feedback_analysis.is_empty());
        assert!(state.feedback_language.is_empty());
        assert!(state.overall_feedback.is_empty());
        assert_eq!(state.iteration_count, 1);
        assert_eq!(state.max_iterations, 4);
    }

    // ─── EssayReport ────────────────────────────────────────────

    #[test]
    fn test_report_hides_infinite_threshold() {
        let state = EssayState::new("e", Plan::Free, f64::INFINITY, 0);
        let report = EssayReport::from_state(state, StopReason::BudgetExhausted, 0);
        assert_eq!(report.threshold, None);
        let json = serde_json::to_value(&report).unwrap();
        assert!(json["threshold"].is_null());
        assert_eq!(json["stop_reason"], "budget_exhausted");
    }

    #[test]
    fn test_gate_decision_display() {
        assert_eq!(GateDecision::Revise.to_string(), "revise");
        assert_eq!(
            GateDecision::Stop(StopReason::QualityMet).to_string(),
            "stop (quality met)"
        );
    }
}
