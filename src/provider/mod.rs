// src/provider/mod.rs — Model provider layer

pub mod openai_compat;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::infra::config::ModelConfig;
use crate::infra::errors::RedraftError;
use openai_compat::OpenAICompatProvider;

/// Core trait that all model providers implement.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    fn id(&self) -> &str;

    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, RedraftError>;
}

/// One single-turn completion: the rendered prompt goes out as the user message.
#[derive(Debug, Clone, Default)]
pub struct ChatRequest {
    pub model: String,
    pub prompt: String,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

#[derive(Debug, Clone)]
pub struct ChatResponse {
    pub content: String,
    pub usage: TokenUsage,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl TokenUsage {
    pub fn total(&self) -> u32 {
        self.input_tokens.saturating_add(self.output_tokens)
    }
}

/// The `generate(prompt) -> text` capability handed to the judge, aggregator
/// and reviser. One provider call per prompt, bounded by a timeout, never retried.
pub struct Generator {
    provider: Arc<dyn ModelProvider>,
    model: String,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
    timeout: Duration,
    input_tokens: AtomicU32,
    output_tokens: AtomicU32,
}

impl Generator {
    pub fn new(provider: Arc<dyn ModelProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature: None,
            max_tokens: None,
            timeout: Duration::from_secs(120),
            input_tokens: AtomicU32::new(0),
            output_tokens: AtomicU32::new(0),
        }
    }

    pub fn from_config(provider: Arc<dyn ModelProvider>, config: &ModelConfig) -> Self {
        Self::new(provider, config.model.clone())
            .with_temperature(config.temperature)
            .with_max_tokens(config.max_tokens)
            .with_timeout(Duration::from_secs(config.timeout_seconds))
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn provider_id(&self) -> &str {
        self.provider.id()
    }

    /// Send one prompt and return the raw text of the reply.
    pub async fn generate(&self, prompt: &str) -> Result<String, RedraftError> {
        let request = ChatRequest {
            model: self.model.clone(),
            prompt: prompt.to_string(),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        let response = tokio::time::timeout(self.timeout, self.provider.chat(request))
            .await
            .map_err(|_| RedraftError::GenerationFailure {
                provider: self.provider.id().to_string(),
                message: format!("no response within {}s", self.timeout.as_secs()),
            })??;

        add_saturating(&self.input_tokens, response.usage.input_tokens);
        add_saturating(&self.output_tokens, response.usage.output_tokens);

        Ok(response.content)
    }

    /// Tokens spent through this generator so far.
    pub fn usage(&self) -> TokenUsage {
        TokenUsage {
            input_tokens: self.input_tokens.load(Ordering::Relaxed),
            output_tokens: self.output_tokens.load(Ordering::Relaxed),
        }
    }
}

fn add_saturating(counter: &AtomicU32, n: u32) {
    // The closure always returns Some, so this cannot fail.
    let _ = counter.fetch_update(Ordering::Relaxed, Ordering::Relaxed, |v| {
        Some(v.saturating_add(n))
    });
}

/// Build the HTTP provider described by `[model]`, reading the key from its env var.
pub fn resolve_provider(config: &ModelConfig) -> Result<Arc<dyn ModelProvider>, RedraftError> {
    let api_key = std::env::var(&config.api_key_env)
        .ok()
        .filter(|k| !k.trim().is_empty())
        .ok_or_else(|| {
            RedraftError::Config(format!(
                "no API key: set {} or change [model].api_key_env",
                config.api_key_env
            ))
        })?;

    Ok(Arc::new(OpenAICompatProvider::new(
        provider_id_for(&config.base_url),
        api_key,
        config.base_url.trim_end_matches('/').to_string(),
    )))
}

/// Short provider id derived from the endpoint host, used in logs and errors.
fn provider_id_for(base_url: &str) -> String {
    let host = base_url
        .split("://")
        .nth(1)
        .unwrap_or(base_url)
        .split(['/', ':'])
        .next()
        .unwrap_or_default();
    match host {
        "openrouter.ai" => "openrouter".into(),
        "api.openai.com" => "openai".into(),
        "localhost" | "127.0.0.1" => "local".into(),
        "" => "custom".into(),
        other => other.to_string(),
    }
}
