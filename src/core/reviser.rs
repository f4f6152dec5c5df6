// src/core/reviser.rs — Rewrites the essay from the cycle's feedback

use std::sync::Arc;

use super::types::EssayState;
use crate::evaluator::rubric::Prompts;
use crate::infra::errors::RedraftError;
use crate::provider::Generator;

pub struct Reviser {
    generator: Arc<Generator>,
    prompts: Arc<Prompts>,
}

impl Reviser {
    pub fn new(generator: Arc<Generator>, prompts: Arc<Prompts>) -> Self {
        Self { generator, prompts }
    }

    /// One rewrite call; the reply is the new essay verbatim.
    pub async fn revise(
        &self,
        essay: &str,
        feedback_language: &str,
        feedback_clarity: &str,
        feedback_analysis: &str,
    ) -> Result<String, RedraftError> {
        let prompt =
            self.prompts
                .rewrite(essay, feedback_language, feedback_clarity, feedback_analysis)?;
        let rewritten = self.generator.generate(&prompt).await?;

        // An empty rewrite would leave nothing to score next cycle.
        if rewritten.trim().is_empty() {
            return Err(RedraftError::GenerationFailure {
                provider: self.generator.provider_id().to_string(),
                message: "rewrite came back empty".into(),
            });
        }
        Ok(rewritten)
    }

    /// Rewrite the state's essay and start a fresh cycle: feedback and scores
    /// cleared, `iteration_count` bumped by one.
    pub async fn revise_state(&self, mut state: EssayState) -> Result<EssayState, RedraftError> {
        let rewritten = self
            .revise(
                &state.essay,
                &state.feedback_language,
                &state.feedback_clarity,
                &state.feedback_analysis,
            )
            .await?;

        tracing::info!(
            iteration = state.iteration_count + 1,
            before_words = crate::util::word_count(&state.essay),
            after_words = crate::util::word_count(&rewritten),
            "Essay revised"
        );

        state.begin_revision(rewritten);
        Ok(state)
    }
}
