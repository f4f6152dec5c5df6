// src/evaluator/aggregate.rs — Mean score and synthesized critique

use std::sync::Arc;

use super::rubric::Prompts;
use crate::core::types::EssayState;
use crate::infra::errors::RedraftError;
use crate::provider::Generator;

/// Arithmetic mean; `0.0` for an empty slice.
pub fn mean(scores: &[f64]) -> f64 {
    if scores.is_empty() {
        return 0.0;
    }
    scores.iter().sum::<f64>() / scores.len() as f64
}

/// The three per-dimension critiques of one cycle.
#[derive(Debug, Clone, Copy)]
pub struct Feedbacks<'a> {
    pub language: &'a str,
    pub analysis: &'a str,
    pub clarity: &'a str,
}

impl<'a> Feedbacks<'a> {
    pub fn from_state(state: &'a EssayState) -> Self {
        Self {
            language: &state.feedback_language,
            analysis: &state.feedback_analysis,
            clarity: &state.feedback_clarity,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Aggregate {
    pub avg_score: f64,
    pub overall_feedback: String,
}

pub struct Aggregator {
    generator: Arc<Generator>,
    prompts: Arc<Prompts>,
}

impl Aggregator {
    pub fn new(generator: Arc<Generator>, prompts: Arc<Prompts>) -> Self {
        Self { generator, prompts }
    }

    /// Average the scores and ask for a short combined critique. The summary
    /// text is used exactly as returned.
    pub async fn aggregate(
        &self,
        scores: &[f64],
        feedbacks: Feedbacks<'_>,
    ) -> Result<Aggregate, RedraftError> {
        let avg_score = mean(scores);
        let prompt = self
            .prompts
            .summary(feedbacks.language, feedbacks.analysis, feedbacks.clarity)?;
        let overall_feedback = self.generator.generate(&prompt).await?;

        tracing::debug!(
            avg_score,
            summary_chars = overall_feedback.len(),
            "Aggregated cycle"
        );

        Ok(Aggregate {
            avg_score,
            overall_feedback,
        })
    }
}
