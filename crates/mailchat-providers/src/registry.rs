//! Provider registry: which chat backend a request goes to, and what it needs.
//!
//! `"gemini"` (any case) picks Gemini and every other name, including the
//! empty string, picks the OpenAI-compatible provider.

use mailchat_core::config::loader::{GEMINI_API_KEY, GEMINI_MODEL, OPENAI_API_KEY, OPENAI_MODEL};
use mailchat_core::{ChatConfig, ChatError};
use tracing::debug;

use crate::gemini::GeminiProvider;
use crate::http_provider::OpenAiProvider;
use crate::traits::ChatProvider;

/// The two supported chat backends.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProviderKind {
    OpenAi,
    Gemini,
}

impl ProviderKind {
    /// Resolve a client-supplied provider name.
    pub fn from_name(name: &str) -> Self {
        if name.trim().eq_ignore_ascii_case("gemini") {
            ProviderKind::Gemini
        } else {
            ProviderKind::OpenAi
        }
    }

    /// Name reported back in `ChatReply::provider`.
    pub fn name(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::Gemini => "gemini",
        }
    }

    /// Human-readable name for logs.
    pub fn display_name(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "OpenAI",
            ProviderKind::Gemini => "Gemini",
        }
    }

    /// Environment variable holding the API key.
    pub fn key_env(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => OPENAI_API_KEY,
            ProviderKind::Gemini => GEMINI_API_KEY,
        }
    }

    /// Environment variable holding the model name.
    pub fn model_env(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => OPENAI_MODEL,
            ProviderKind::Gemini => GEMINI_MODEL,
        }
    }

    /// `(api_key, model, api_base)` for this provider.
    pub fn settings<'a>(&self, config: &'a ChatConfig) -> (&'a str, &'a str, &'a str) {
        match self {
            ProviderKind::OpenAi => (
                &config.openai_api_key,
                &config.openai_model,
                &config.openai_api_base,
            ),
            ProviderKind::Gemini => (
                &config.gemini_api_key,
                &config.gemini_model,
                &config.gemini_api_base,
            ),
        }
    }

    /// Check that the key and then the model are set.
    pub fn validate(&self, config: &ChatConfig) -> Result<(), ChatError> {
        let (api_key, model, _) = self.settings(config);
        if api_key.is_empty() {
            return Err(ChatError::MissingConfig(self.key_env()));
        }
        if model.is_empty() {
            return Err(ChatError::MissingConfig(self.model_env()));
        }
        Ok(())
    }
}

/// Validate the configuration and build the provider client.
pub fn create_provider(
    kind: ProviderKind,
    config: &ChatConfig,
) -> Result<Box<dyn ChatProvider>, ChatError> {
    kind.validate(config)?;
    let (api_key, model, api_base) = kind.settings(config);

    debug!(
        provider = kind.display_name(),
        model = model,
        api_base = api_base,
        "Creating chat provider"
    );

    Ok(match kind {
        ProviderKind::OpenAi => Box::new(OpenAiProvider::new(api_key, model, api_base)),
        ProviderKind::Gemini => Box::new(GeminiProvider::new(api_key, model, api_base)),
    })
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
