// src/core/orchestrator.rs — Score, aggregate, gate, revise loop

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use super::gate;
use super::reviser::Reviser;
use super::types::*;
use crate::evaluator::rubric::Prompts;
use crate::evaluator::{Aggregator, Feedbacks, Judge};
use crate::infra::config::Config;
use crate::infra::errors::RedraftError;
use crate::provider::{Generator, ModelProvider};

type ProgressFn = Box<dyn Fn(ProgressEvent) + Send + Sync>;

/// Drives one essay through repeated evaluate → aggregate → decide → rewrite
/// cycles until the gate says stop.
///
/// Every failure aborts the whole request; no partial state is returned.
pub struct Orchestrator {
    generator: Arc<Generator>,
    judge: Judge,
    aggregator: Aggregator,
    reviser: Reviser,
    parallel_scoring: bool,
    cancel: Option<CancellationToken>,
    on_progress: Option<ProgressFn>,
}

impl Orchestrator {
    pub fn new(generator: Arc<Generator>) -> Self {
        let prompts = Arc::new(Prompts::new());
        Self {
            judge: Judge::new(generator.clone(), prompts.clone()),
            aggregator: Aggregator::new(generator.clone(), prompts.clone()),
            reviser: Reviser::new(generator.clone(), prompts),
            generator,
            parallel_scoring: false,
            cancel: None,
            on_progress: None,
        }
    }

    /// Build an orchestrator with a fresh generator over `provider`.
    pub fn from_config(provider: Arc<dyn ModelProvider>, config: &Config) -> Self {
        let generator = Generator::from_config(provider, &config.model);
        Self::new(Arc::new(generator)).with_parallel_scoring(config.refine.parallel_scoring)
    }

    pub fn with_parallel_scoring(mut self, parallel: bool) -> Self {
        self.parallel_scoring = parallel;
        self
    }

    /// Checked between cycles; a cancelled token ends the run with `Cancelled`.
    pub fn with_cancel(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Set a callback for real-time progress events.
    pub fn with_progress(mut self, cb: impl Fn(ProgressEvent) + Send + Sync + 'static) -> Self {
        self.on_progress = Some(Box::new(cb));
        self
    }

    fn emit(&self, event: ProgressEvent) {
        if let Some(ref cb) = self.on_progress {
            cb(event);
        }
    }

    fn check_cancelled(&self) -> Result<(), RedraftError> {
        match self.cancel {
            Some(ref token) if token.is_cancelled() => {
                tracing::warn!("Evaluation cancelled between cycles");
                Err(RedraftError::Cancelled)
            }
            _ => Ok(()),
        }
    }

    /// Validate the request and run it to completion.
    pub async fn run(&self, request: EssayRequest) -> Result<EssayReport, RedraftError> {
        let state = EssayState::from_request(&request)?;
        let span = tracing::info_span!(
            "essay",
            request_id = %uuid::Uuid::new_v4(),
            plan = %state.plan,
        );
        self.run_state(state).instrument(span).await
    }

    /// Run the loop from an already-validated state.
    pub async fn run_state(&self, mut state: EssayState) -> Result<EssayReport, RedraftError> {
        let mut cycle = 0u32;

        loop {
            self.check_cancelled()?;
            cycle += 1;
            self.emit(ProgressEvent::CycleStart {
                cycle,
                iteration_count: state.iteration_count,
                max_iterations: state.max_iterations,
            });

            // Score: three slots, merged in fixed order
            let judged = self
                .judge
                .score_all(&state.essay, state.iteration_count, self.parallel_scoring)
                .await?;
            for j in &judged {
                self.emit(ProgressEvent::DimensionScored {
                    dimension: j.dimension,
                    score: j.verdict.score,
                    elapsed_ms: j.elapsed.as_millis() as u64,
                });
            }
            state.record_cycle(CycleScores::from(judged));

            // Aggregate
            let aggregate = self
                .aggregator
                .aggregate(&state.scores, Feedbacks::from_state(&state))
                .await?;
            state.avg_score = aggregate.avg_score;
            state.overall_feedback = aggregate.overall_feedback;
            state.needs_improvement =
                gate::needs_improvement(state.avg_score, state.threshold, state.plan);
            self.emit(ProgressEvent::Aggregated {
                avg_score: state.avg_score,
                threshold: state.threshold,
            });

            // Gate
            let decision = gate::decide(
                state.avg_score,
                state.threshold,
                state.iteration_count,
                state.max_iterations,
            );
            self.emit(ProgressEvent::Decision { decision });

            match decision {
                GateDecision::Stop(reason) => {
                    let tokens_used = self.generator.usage().total();
                    self.emit(ProgressEvent::Complete {
                        avg_score: state.avg_score,
                        iteration_count: state.iteration_count,
                        tokens_used,
                    });
                    return Ok(EssayReport::from_state(state, reason, tokens_used));
                }
                GateDecision::Revise => {
                    self.check_cancelled()?;
                    state = self.reviser.revise_state(state).await?;
                    self.emit(ProgressEvent::Revised {
                        iteration_count: state.iteration_count,
                        essay_chars: state.essay.chars().count(),
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{ChatRequest, ChatResponse, TokenUsage};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Scores every dimension `score` and counts calls.
    struct FlatProvider {
        score: f64,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ModelProvider for FlatProvider {
        fn id(&self) -> &str {
            "flat"
        }
        async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, RedraftError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let prompt = &request.prompt;
            let content = if prompt.contains("Respond ONLY with minified valid JSON") {
                format!(r#"{{"feedback":"meh","score":{}}}"#, self.score)
            } else if prompt.contains("summarization expert") {
                "Summary.".to_string()
            } else {
                "Rewritten essay.".to_string()
            };
            Ok(ChatResponse {
                content,
                usage: TokenUsage {
                    input_tokens: 3,
                    output_tokens: 2,
                },
            })
        }
    }

    fn flat(score: f64) -> Arc<FlatProvider> {
        Arc::new(FlatProvider {
            score,
            calls: AtomicUsize::new(0),
        })
    }

    fn orchestrator(provider: Arc<FlatProvider>) -> Orchestrator {
        Orchestrator::new(Arc::new(Generator::new(provider, "m")))
    }

    #[tokio::test]
    async fn test_invalid_input_makes_no_calls() {
        let provider = flat(5.0);
        let o = orchestrator(provider.clone());
        let err = o
            .run(EssayRequest::new("   ", Plan::Premium))
            .await
            .unwrap_err();
        assert!(matches!(err, RedraftError::InvalidInput(_)));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_quality_met_first_cycle() {
        let provider = flat(9.5);
        let report = orchestrator(provider.clone())
            .run(EssayRequest::new("Essay.", Plan::Premium))
            .await
            .unwrap();
        assert_eq!(report.iteration_count, 0);
        assert_eq!(report.stop_reason, StopReason::QualityMet);
        assert!(!report.needs_improvement);
        assert_eq!(report.essay, "Essay.");
        assert_eq!(report.overall_feedback, "Summary.");
        // three judges + one summary
        assert_eq!(provider.calls.load(Ordering::SeqCst), 4);
        assert_eq!(report.tokens_used, 20);
    }

    #[tokio::test]
    async fn test_budget_exhausted_counts_calls() {
        let provider = flat(4.0);
        let report = orchestrator(provider.clone())
            .run(EssayRequest::new("Essay.", Plan::Basic))
            .await
            .unwrap();
        assert_eq!(report.iteration_count, 2);
        assert_eq!(report.stop_reason, StopReason::BudgetExhausted);
        assert!(report.needs_improvement);
        assert_eq!(report.essay, "Rewritten essay.");
        // 3 cycles × (3 judges + summary) + 2 rewrites
        assert_eq!(provider.calls.load(Ordering::SeqCst), 14);
    }

    #[tokio::test]
    async fn test_progress_events_in_order() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        let o = orchestrator(flat(4.0)).with_progress(move |e| {
            let tag = match e {
                ProgressEvent::CycleStart { .. } => "start",
                ProgressEvent::DimensionScored { .. } => "scored",
                ProgressEvent::Aggregated { .. } => "aggregated",
                ProgressEvent::Decision { .. } => "decision",
                ProgressEvent::Revised { .. } => "revised",
                ProgressEvent::Complete { .. } => "complete",
            };
            sink.lock().unwrap().push(tag);
        });
        o.run(EssayRequest::new("Essay.", Plan::Basic).with_max_iterations(1))
            .await
            .unwrap();

        let cycle = ["start", "scored", "scored", "scored", "aggregated", "decision"];
        let mut expected: Vec<&str> = cycle.to_vec();
        expected.push("revised");
        expected.extend(cycle);
        expected.push("complete");
        assert_eq!(*events.lock().unwrap(), expected);
    }

    #[tokio::test]
    async fn test_cancel_before_start() {
        let provider = flat(4.0);
        let token = CancellationToken::new();
        token.cancel();
        let err = orchestrator(provider.clone())
            .with_cancel(token)
            .run(EssayRequest::new("Essay.", Plan::Premium))
            .await
            .unwrap_err();
        assert!(matches!(err, RedraftError::Cancelled));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_cancel_between_cycles() {
        let provider = flat(4.0);
        let token = CancellationToken::new();
        let trigger = token.clone();
        let err = orchestrator(provider.clone())
            .with_cancel(token)
            .with_progress(move |e| {
                if let ProgressEvent::Revised { .. } = e {
                    trigger.cancel();
                }
            })
            .run(EssayRequest::new("Essay.", Plan::Premium))
            .await
            .unwrap_err();
        assert!(matches!(err, RedraftError::Cancelled));
        // one full cycle plus one rewrite, then stopped at the boundary
        assert_eq!(provider.calls.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn test_parallel_scoring_same_outcome() {
        let report = orchestrator(flat(6.0))
            .with_parallel_scoring(true)
            .run(EssayRequest::new("Essay.", Plan::Basic))
            .await
            .unwrap();
        assert_eq!(report.iteration_count, 2);
        assert_eq!(report.avg_score, 6.0);
    }
}
