// src/provider/openai_compat.rs — Generic OpenAI-compatible provider
//
// Used by: OpenRouter (default), OpenAI, Groq, Together, local Ollama/vLLM servers.

use async_trait::async_trait;

use super::{ChatRequest, ChatResponse, ModelProvider, TokenUsage};
use crate::infra::errors::RedraftError;

/// Provider for any OpenAI-compatible `/chat/completions` endpoint.
pub struct OpenAICompatProvider {
    id_str: String,
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl OpenAICompatProvider {
    pub fn new(id: impl Into<String>, api_key: String, base_url: String) -> Self {
        Self {
            id_str: id.into(),
            api_key,
            base_url,
            client: reqwest::Client::new(),
        }
    }

    fn failure(&self, message: impl Into<String>) -> RedraftError {
        RedraftError::GenerationFailure {
            provider: self.id_str.clone(),
            message: message.into(),
        }
    }
}

/// Build the JSON body for a chat completion request.
pub(crate) fn request_body(request: &ChatRequest) -> serde_json::Value {
    let mut body = serde_json::json!({
        "model": request.model,
        "messages": [{"role": "user", "content": request.prompt}],
    });
    if let Some(max_tokens) = request.max_tokens {
        body["max_tokens"] = serde_json::json!(max_tokens);
    }
    if let Some(temp) = request.temperature {
        body["temperature"] = serde_json::json!(temp);
    }
    body
}

/// Pull the assistant text and token usage out of a completion response.
pub(crate) fn parse_completion(resp: &serde_json::Value) -> Option<ChatResponse> {
    let content = resp["choices"][0]["message"]["content"].as_str()?.to_string();

    let usage = TokenUsage {
        input_tokens: token_count(&resp["usage"]["prompt_tokens"]),
        output_tokens: token_count(&resp["usage"]["completion_tokens"]),
    };

    Some(ChatResponse { content, usage })
}

/// Missing counts read as zero; counts past `u32::MAX` clamp.
fn token_count(value: &serde_json::Value) -> u32 {
    value
        .as_u64()
        .map(|n| u32::try_from(n).unwrap_or(u32::MAX))
        .unwrap_or(0)
}

#[async_trait]
impl ModelProvider for OpenAICompatProvider {
    fn id(&self) -> &str {
        &self.id_str
    }

    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, RedraftError> {
        let body = request_body(&request);
        tracing::debug!(
            provider = %self.id_str,
            model = %request.model,
            "Sending chat completion request"
        );

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header(
                "User-Agent",
                format!("redraft/{}", env!("CARGO_PKG_VERSION")),
            )
            .json(&body)
            .send()
            .await
            .map_err(|e| self.failure(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response.text().await.unwrap_or_default();
            return Err(self.failure(format!("HTTP {status}: {error_body}")));
        }

        let resp: serde_json::Value = response
            .json()
            .await
            .map_err(|e| self.failure(format!("unreadable response body: {e}")))?;

        parse_completion(&resp).ok_or_else(|| self.failure("response has no message content"))
    }
}
