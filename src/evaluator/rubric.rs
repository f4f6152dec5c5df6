// src/evaluator/rubric.rs — Prompt templates for judging, summarizing and rewriting

use minijinja::{context, Environment};

use crate::core::types::Dimension;
use crate::infra::errors::RedraftError;

const JUDGE_LANGUAGE: &str = "\
You are a strict language quality evaluator with 20+ years of experience marking competitive exam essays.
Assess ONLY language quality: grammar, clarity, coherence, tone and vocabulary.

Essay:
{{ essay }}

Instructions:
1. Give detailed feedback on grammar, clarity, flow, tone and vocabulary.
2. Give a score from 0.0 to 10.0 with one decimal place.
3. Respond ONLY with minified valid JSON:
{\"feedback\":\"...\",\"score\":0.0}";

const JUDGE_ANALYSIS: &str = "\
You are a strict evaluator of analytical depth in competitive exam essays.
Assess ONLY analytical quality: reasoning, evidence, critical thinking and logical connections.

Essay:
{{ essay }}

Instructions:
1. Give detailed feedback on the depth and rigour of the analysis.
2. Give a score from 0.0 to 10.0 with one decimal place.
3. Respond ONLY with minified valid JSON:
{\"feedback\":\"...\",\"score\":0.0}";

const JUDGE_CLARITY: &str = "\
You are a strict evaluator of clarity of thought in competitive exam essays.
Assess ONLY logical flow, organization and ease of understanding.

Essay:
{{ essay }}

Instructions:
1. Give detailed feedback on logical sequencing, transitions, contradictions and readability.
2. Give a score from 0.0 to 10.0 with one decimal place.
3. Respond ONLY with minified valid JSON:
{\"feedback\":\"...\",\"score\":0.0}";

const SUMMARY: &str = "\
You are a summarization expert.
Combine the feedback below into one concise critique that states the major mistakes plainly.

Language feedback:
{{ language }}

Analysis feedback:
{{ analysis }}

Clarity feedback:
{{ clarity }}

Instructions:
1. Merge overlapping points and focus on deficiencies rather than praise.
2. Say so if the essay is too short to develop its ideas.
3. Keep the summary to 2-3 sentences.
4. Return ONLY plain prose, no JSON or commentary.";

const REWRITE: &str = "\
You are an expert essay writer with mastery of formal, persuasive and logically coherent prose.

Rewrite the essay below, guided by this feedback:

Clarity: {{ clarity }}
Language: {{ language }}
Analysis: {{ analysis }}

Original essay:
{{ essay }}

Guidelines:
- Keep the original theme and ideas.
- Improve logical flow and vocabulary.
- Deepen the analysis with concrete examples.
- Avoid repetition and fluff.
- Expand modestly where it improves quality.

Return ONLY the improved essay as plain text.";

/// Compiled prompt templates.
pub struct Prompts {
    env: Environment<'static>,
}

impl Default for Prompts {
    fn default() -> Self {
        Self::new()
    }
}

const BUILT_IN: [(&str, &str); 5] = [
    ("judge_language", JUDGE_LANGUAGE),
    ("judge_analysis", JUDGE_ANALYSIS),
    ("judge_clarity", JUDGE_CLARITY),
    ("summary", SUMMARY),
    ("rewrite", REWRITE),
];

impl Prompts {
    /// Compile the built-in templates.
    ///
    /// A template that fails to compile is logged and left out. The failure
    /// then shows up as a `Prompt` error on the first render of that template,
    /// so only the calls that need it fail. Use [`Prompts::try_new`] to fail at
    /// construction instead.
    pub fn new() -> Self {
        Self::lenient(&BUILT_IN)
    }

    /// Compile the built-in templates, failing on the first one that doesn't.
    pub fn try_new() -> Result<Self, RedraftError> {
        Self::strict(&BUILT_IN)
    }

    fn lenient(sources: &[(&'static str, &'static str)]) -> Self {
        let mut env = Environment::new();
        for &(name, source) in sources {
            if let Err(e) = env.add_template(name, source) {
                tracing::error!("Prompt template '{}' failed to compile: {}", name, e);
            }
        }
        Self { env }
    }

    fn strict(sources: &[(&'static str, &'static str)]) -> Result<Self, RedraftError> {
        let mut env = Environment::new();
        for &(name, source) in sources {
            env.add_template(name, source)?;
        }
        Ok(Self { env })
    }

    fn render(&self, name: &str, ctx: minijinja::Value) -> Result<String, RedraftError> {
        Ok(self.env.get_template(name)?.render(ctx)?)
    }

    /// Scoring prompt for one dimension.
    pub fn judge(&self, dimension: Dimension, essay: &str) -> Result<String, RedraftError> {
        let name = match dimension {
            Dimension::Language => "judge_language",
            Dimension::Analysis => "judge_analysis",
            Dimension::Clarity => "judge_clarity",
        };
        self.render(name, context! { essay })
    }

    pub fn summary(
        &self,
        language: &str,
        analysis: &str,
        clarity: &str,
    ) -> Result<String, RedraftError> {
        self.render("summary", context! { language, analysis, clarity })
    }

    pub fn rewrite(
        &self,
        essay: &str,
        language: &str,
        clarity: &str,
        analysis: &str,
    ) -> Result<String, RedraftError> {
        self.render("rewrite", context! { essay, language, clarity, analysis })
    }
}
