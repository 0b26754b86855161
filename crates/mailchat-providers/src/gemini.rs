//! Gemini `generateContent` client.
//!
//! The API key travels as the `key` query parameter, so transport errors are
//! stripped of their URL before they are logged or returned.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use mailchat_core::ChatError;

use crate::traits::{build_client, ChatProvider, LlmRequestConfig};

const PROVIDER: &str = "gemini";

// ─────────────────────────────────────────────
// Wire types
// ─────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f64,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

impl GenerateContentResponse {
    fn into_reply(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .next()?
            .text
    }
}

// ─────────────────────────────────────────────
// GeminiProvider
// ─────────────────────────────────────────────

pub struct GeminiProvider {
    client: reqwest::Client,
    api_base: String,
    api_key: String,
    model: String,
}

impl std::fmt::Debug for GeminiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiProvider")
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .finish()
    }
}

impl GeminiProvider {
    pub fn new(api_key: &str, model: &str, api_base: &str) -> Self {
        Self {
            client: build_client(),
            api_base: api_base.to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        }
    }

    fn generate_url(&self) -> String {
        let base = self.api_base.trim_end_matches('/');
        format!("{}/models/{}:generateContent", base, self.model)
    }
}

#[async_trait]
impl ChatProvider for GeminiProvider {
    async fn complete(&self, message: &str, config: &LlmRequestConfig) -> Result<String, ChatError> {
        debug!(model = %self.model, chars = message.len(), "Calling Gemini");

        let body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part { text: message }],
            }],
            generation_config: GenerationConfig {
                temperature: config.temperature,
            },
        };

        let response = self
            .client
            .post(self.generate_url())
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                let e = e.without_url();
                error!(provider = PROVIDER, error = %e, "HTTP request failed");
                ChatError::Upstream {
                    provider: PROVIDER,
                    detail: e.to_string(),
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!(provider = PROVIDER, status = %status, body = %error_text, "API error");
            return Err(ChatError::Upstream {
                provider: PROVIDER,
                detail: format!("HTTP {}: {}", status, error_text),
            });
        }

        let parsed: GenerateContentResponse = response.json().await.map_err(|e| {
            let e = e.without_url();
            error!(provider = PROVIDER, error = %e, "Failed to parse response");
            ChatError::MalformedResponse {
                provider: PROVIDER,
                detail: e.to_string(),
            }
        })?;

        parsed.into_reply().ok_or_else(|| ChatError::MalformedResponse {
            provider: PROVIDER,
            detail: "missing candidates[0].content.parts[0].text".to_string(),
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
