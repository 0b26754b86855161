//! HTTP client for OpenAI-compatible `/chat/completions` APIs.
//!
//! Sends a single user message, no tools, no streaming, and unwraps
//! `choices[0].message.content`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use mailchat_core::ChatError;

use crate::traits::{build_client, ChatProvider, LlmRequestConfig};

const PROVIDER: &str = "openai";

// ─────────────────────────────────────────────
// Wire types
// ─────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    temperature: f64,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl ChatCompletionResponse {
    fn into_reply(self) -> Option<String> {
        self.choices.into_iter().next()?.message.content
    }
}

// ─────────────────────────────────────────────
// OpenAiProvider
// ─────────────────────────────────────────────

/// Client for any OpenAI-compatible chat completions endpoint.
pub struct OpenAiProvider {
    /// HTTP client with the chat timeout applied.
    client: reqwest::Client,
    /// API base URL (e.g. `"https://api.openai.com/v1"`).
    api_base: String,
    /// API key for Bearer authentication.
    api_key: String,
    model: String,
}

impl std::fmt::Debug for OpenAiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiProvider")
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .finish()
    }
}

impl OpenAiProvider {
    pub fn new(api_key: &str, model: &str, api_base: &str) -> Self {
        Self {
            client: build_client(),
            api_base: api_base.to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        }
    }

    /// Build the full chat completions URL.
    fn completions_url(&self) -> String {
        let base = self.api_base.trim_end_matches('/');
        format!("{}/chat/completions", base)
    }
}

#[async_trait]
impl ChatProvider for OpenAiProvider {
    async fn complete(&self, message: &str, config: &LlmRequestConfig) -> Result<String, ChatError> {
        debug!(model = %self.model, chars = message.len(), "Calling OpenAI");

        let body = ChatCompletionRequest {
            model: &self.model,
            messages: vec![WireMessage {
                role: "user",
                content: message,
            }],
            temperature: config.temperature,
        };

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!(provider = PROVIDER, error = %e, "HTTP request failed");
                ChatError::Upstream {
                    provider: PROVIDER,
                    detail: e.to_string(),
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            error!(provider = PROVIDER, status = %status, body = %error_text, "API error");
            return Err(ChatError::Upstream {
                provider: PROVIDER,
                detail: format!("HTTP {}: {}", status, error_text),
            });
        }

        let parsed: ChatCompletionResponse = response.json().await.map_err(|e| {
            error!(provider = PROVIDER, error = %e, "Failed to parse response");
            ChatError::MalformedResponse {
                provider: PROVIDER,
                detail: e.to_string(),
            }
        })?;

        parsed.into_reply().ok_or_else(|| ChatError::MalformedResponse {
            provider: PROVIDER,
            detail: "missing choices[0].message.content".to_string(),
        })
    }

    fn name(&self) -> &'static str {
        PROVIDER
    }

    fn model(&self) -> &str {
        &self.model
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
