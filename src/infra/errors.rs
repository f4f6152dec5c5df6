// src/infra/errors.rs — Error types for redraft

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RedraftError {
    // Caller errors (fix the request and resubmit)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // Evaluation errors (transient, retry the whole request)
    #[error("Malformed {dimension} response: {reason}")]
    MalformedResponse {
        dimension: String,
        reason: String,
        raw: String,
    },

    #[error("Generation failed on '{provider}': {message}")]
    GenerationFailure { provider: String, message: String },

    #[error("Evaluation cancelled")]
    Cancelled,

    // Infra
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Prompt template error: {0}")]
    Prompt(#[from] minijinja::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RedraftError {
    /// Whether resubmitting the same request may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            RedraftError::MalformedResponse { .. } | RedraftError::GenerationFailure { .. }
        )
    }

    /// The raw model output attached to a malformed response, if any.
    pub fn raw_response(&self) -> Option<&str> {
        match self {
            RedraftError::MalformedResponse { raw, .. } => Some(raw),
            _ => None,
        }
    }

    pub(crate) fn malformed(
        dimension: impl Into<String>,
        reason: impl Into<String>,
        raw: impl Into<String>,
    ) -> Self {
        RedraftError::MalformedResponse {
            dimension: dimension.into(),
            reason: reason.into(),
            raw: raw.into(),
        }
    }
}
