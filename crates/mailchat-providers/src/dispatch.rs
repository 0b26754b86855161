//! Chat dispatch: pick the provider, validate its config, call it once.

use mailchat_core::{ChatConfig, ChatError, ChatReply};
use tracing::{info, warn};

use crate::registry::{create_provider, ProviderKind};
use crate::traits::LlmRequestConfig;

/// Forward `message` to the provider named by `provider`.
///
/// `"gemini"` (any case) goes to Gemini, everything else to OpenAI.
/// Missing key or model fails before any network call.
pub async fn dispatch_chat(
    provider: &str,
    message: &str,
    config: &ChatConfig,
) -> Result<ChatReply, ChatError> {
    let kind = ProviderKind::from_name(provider);
    let client = create_provider(kind, config).map_err(|e| {
        warn!(provider = kind.name(), error = %e, "chat provider not configured");
        e
    })?;

    let reply = client.complete(message, &LlmRequestConfig::default()).await?;

    info!(
        provider = kind.name(),
        model = client.model(),
        reply_chars = reply.len(),
        "chat reply received"
    );

    Ok(ChatReply::new(kind.name(), reply))
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_gemini_uppercase_missing_key() {
        let config = ChatConfig {
            openai_api_key: "sk-test".into(),
            openai_model: "gpt-4o-mini".into(),
            gemini_model: "gemini-1.5-flash".into(),
            ..Default::default()
        };
        let err = dispatch_chat("GEMINI", "hi", &config).await.unwrap_err();
        match err {
            ChatError::MissingConfig(var) => assert_eq!(var, "GEMINI_API_KEY"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_empty_provider_defaults_to_openai() {
        let err = dispatch_chat("", "hi", &ChatConfig::default())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "OPENAI_API_KEY is not set.");
        assert_eq!(err.status_code(), 400);
    }

    #[tokio::test]
    async fn test_dispatch_openai_reply() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"content": "pong"}}]
            })))
            .mount(&mock_server)
            .await;

        let config = ChatConfig {
            openai_api_key: "sk-test".into(),
            openai_model: "gpt-4o-mini".into(),
            openai_api_base: mock_server.uri(),
            ..Default::default()
        };
        let reply = dispatch_chat("openai", "ping", &config).await.unwrap();
        assert_eq!(reply, ChatReply::new("openai", "pong"));
    }

    #[tokio::test]
    async fn test_dispatch_gemini_reply() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-pro:generateContent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{"content": {"parts": [{"text": "pong"}]}}]
            })))
            .mount(&mock_server)
            .await;

        let config = ChatConfig {
            gemini_api_key: "gm".into(),
            gemini_model: "gemini-pro".into(),
            gemini_api_base: mock_server.uri(),
            ..Default::default()
        };
        let reply = dispatch_chat("Gemini", "ping", &config).await.unwrap();
        assert_eq!(reply.provider, "gemini");
        assert_eq!(reply.reply, "pong");
    }

    #[tokio::test]
    async fn test_upstream_failure_maps_to_502() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&mock_server)
            .await;

        let config = ChatConfig {
            openai_api_key: "sk-test".into(),
            openai_model: "gpt-4o-mini".into(),
            openai_api_base: mock_server.uri(),
            ..Default::default()
        };
        let err = dispatch_chat("openai", "ping", &config).await.unwrap_err();
        assert_eq!(err.status_code(), 502);
    }
}
