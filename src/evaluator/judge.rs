// src/evaluator/judge.rs — LLM judge execution

use std::sync::Arc;
use std::time::{Duration, Instant};

use super::parser::parse_judge_response;
use super::rubric::Prompts;
use crate::core::types::{CycleScores, Dimension, DimensionFeedback};
use crate::infra::errors::RedraftError;
use crate::provider::Generator;

/// One dimension's verdict plus how long the call took.
#[derive(Debug, Clone)]
pub struct Judged {
    pub dimension: Dimension,
    pub verdict: DimensionFeedback,
    pub elapsed: Duration,
}

/// Scores an essay on each rubric through the injected generator.
pub struct Judge {
    generator: Arc<Generator>,
    prompts: Arc<Prompts>,
}

impl Judge {
    pub fn new(generator: Arc<Generator>, prompts: Arc<Prompts>) -> Self {
        Self { generator, prompts }
    }

    pub async fn score_language(&self, essay: &str, iteration: u32) -> Result<Judged, RedraftError> {
        self.score(Dimension::Language, essay, iteration).await
    }

    pub async fn score_analysis(&self, essay: &str, iteration: u32) -> Result<Judged, RedraftError> {
        self.score(Dimension::Analysis, essay, iteration).await
    }

    pub async fn score_clarity(&self, essay: &str, iteration: u32) -> Result<Judged, RedraftError> {
        self.score(Dimension::Clarity, essay, iteration).await
    }

    /// Run one rubric. A reply that can't be parsed fails the call; there is no retry.
    ///
    /// Every call logs one line with its dimension, iteration and elapsed time,
    /// whether it succeeds or not.
    pub async fn score(
        &self,
        dimension: Dimension,
        essay: &str,
        iteration: u32,
    ) -> Result<Judged, RedraftError> {
        let prompt = self.prompts.judge(dimension, essay)?;
        let start = Instant::now();

        let outcome = self
            .generator
            .generate(&prompt)
            .await
            .and_then(|raw| parse_judge_response(dimension, &raw));
        let elapsed = start.elapsed();
        let elapsed_ms = elapsed.as_millis() as u64;

        match outcome {
            Ok(verdict) => {
                tracing::info!(
                    dimension = %dimension,
                    iteration,
                    elapsed_ms,
                    score = verdict.score,
                    "Scored dimension"
                );
                Ok(Judged {
                    dimension,
                    verdict,
                    elapsed,
                })
            }
            Err(e) => {
                tracing::warn!(
                    dimension = %dimension,
                    iteration,
                    elapsed_ms,
                    error = %e,
                    "Scoring call failed"
                );
                Err(e)
            }
        }
    }

    /// Score all three rubrics, returned in clarity, analysis, language order.
    ///
    /// With `parallel` the calls are issued together; each result still lands
    /// in its own position, and the first failure aborts the rest.
    pub async fn score_all(
        &self,
        essay: &str,
        iteration: u32,
        parallel: bool,
    ) -> Result<[Judged; 3], RedraftError> {
        if parallel {
            let (clarity, analysis, language) = tokio::try_join!(
                self.score_clarity(essay, iteration),
                self.score_analysis(essay, iteration),
                self.score_language(essay, iteration),
            )?;
            return Ok([clarity, analysis, language]);
        }

        let clarity = self.score_clarity(essay, iteration).await?;
        let analysis = self.score_analysis(essay, iteration).await?;
        let language = self.score_language(essay, iteration).await?;
        Ok([clarity, analysis, language])
    }
}

impl From<[Judged; 3]> for CycleScores {
    fn from(judged: [Judged; 3]) -> Self {
        let [clarity, analysis, language] = judged;
        debug_assert_eq!(clarity.dimension, Dimension::Clarity);
        debug_assert_eq!(analysis.dimension, Dimension::Analysis);
        debug_assert_eq!(language.dimension, Dimension::Language);
        CycleScores {
            clarity: clarity.verdict,
            analysis: analysis.verdict,
            language: language.verdict,
        }
    }
}
