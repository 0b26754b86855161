//! Chat provider trait: the seam between dispatch and the concrete HTTP clients.

use std::time::Duration;

use async_trait::async_trait;
use mailchat_core::ChatError;

/// Sampling temperature used for every chat call.
pub const DEFAULT_TEMPERATURE: f64 = 0.3;

/// Per-request timeout for chat calls.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Parameters passed to each chat call.
#[derive(Clone, Debug)]
pub struct LlmRequestConfig {
    /// Sampling temperature (0.0 to 2.0).
    pub temperature: f64,
}

impl Default for LlmRequestConfig {
    fn default() -> Self {
        Self {
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

/// A single-turn chat completion backend.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Send one user message and return the reply text.
    ///
    /// Transport failures and non-2xx statuses come back as
    /// `ChatError::Upstream`; a 2xx body without a reply as
    /// `ChatError::MalformedResponse`.
    async fn complete(&self, message: &str, config: &LlmRequestConfig) -> Result<String, ChatError>;

    /// Short provider name reported to clients (`"openai"`, `"gemini"`).
    fn name(&self) -> &'static str;

    /// Model this instance sends requests to.
    fn model(&self) -> &str;
}

/// Build the shared HTTP client with the chat timeout applied.
pub(crate) fn build_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}
