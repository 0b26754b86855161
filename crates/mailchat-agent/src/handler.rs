//! Chat handler: one message in, one reply out.
//!
//! Email commands are executed directly and summarized; anything else is
//! forwarded to the selected chat provider.

use mailchat_core::config::resolve_chat_config;
use mailchat_core::{ActionResult, ChatConfig, ChatError};
use mailchat_providers::{dispatch_chat, ProviderKind};
use mailchat_workspace::WorkspaceExecutor;
use serde::Serialize;
use tracing::{debug, info};

use crate::intent::{parse_intent, ParsedIntent};

/// Reply body for `/api/chat`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChatResponse {
    pub provider: String,
    pub reply: String,
    /// Present when the message was an email command.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<ActionResult>,
}

/// Routes chat messages using one configuration snapshot.
#[derive(Clone, Debug)]
pub struct ChatHandler {
    chat: ChatConfig,
    executor: WorkspaceExecutor,
}

impl ChatHandler {
    pub fn new(chat: ChatConfig, executor: WorkspaceExecutor) -> Self {
        Self { chat, executor }
    }

    /// Snapshot the current environment. Build one per request.
    pub fn from_env() -> Self {
        Self::new(resolve_chat_config(), WorkspaceExecutor::from_env())
    }

    pub async fn handle(&self, message: &str, provider: &str) -> Result<ChatResponse, ChatError> {
        let message = message.trim();
        if message.is_empty() {
            return Err(ChatError::EmptyMessage);
        }

        let intent = parse_intent(message);
        debug!(intent = intent.kind(), "parsed chat message");

        let action = match intent {
            ParsedIntent::SendEmail { to, subject, body } => {
                self.executor.send_email(&to, &subject, &body).await
            }
            ParsedIntent::DeleteEmail { message_id } => self.executor.delete_email(&message_id).await,
            ParsedIntent::ListEmails { query } => self.executor.list_emails(Some(&query)).await,
            ParsedIntent::None => {
                let reply = dispatch_chat(provider, message, &self.chat).await?;
                return Ok(ChatResponse {
                    provider: reply.provider,
                    reply: reply.reply,
                    action: None,
                });
            }
        };

        info!(status = action.status.as_str(), "email command handled from chat");
        Ok(ChatResponse {
            provider: ProviderKind::from_name(provider).name().to_string(),
            reply: action.summary(),
            action: Some(action),
        })
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use mailchat_core::{ActionStatus, OAuthConfig, WorkspaceConfig};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn handler(chat: ChatConfig, workspace: WorkspaceConfig) -> ChatHandler {
        ChatHandler::new(chat, WorkspaceExecutor::new(workspace, OAuthConfig::default()))
    }

    fn service_account() -> WorkspaceConfig {
        WorkspaceConfig {
            client_email: "svc@p.iam.gserviceaccount.com".into(),
            private_key: "key".into(),
            delegated_user: "me@corp.com".into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_empty_message_rejected() {
        let err = handler(ChatConfig::default(), WorkspaceConfig::default())
            .handle("   ", "openai")
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::EmptyMessage));
        assert_eq!(err.status_code(), 400);
    }

    #[tokio::test]
    async fn test_email_command_skips_model() {
        // No chat credentials: a model call would fail with MissingConfig.
        let response = handler(ChatConfig::default(), service_account())
            .handle("send email to a@b.com subject Hi body Hello", "Gemini")
            .await
            .unwrap();

        assert_eq!(response.provider, "gemini");
        assert_eq!(response.reply, "Email to a@b.com queued for delivery.");
        let action = response.action.unwrap();
        assert_eq!(action.status, ActionStatus::Queued);
    }

    #[tokio::test]
    async fn test_list_without_credentials_reports_warning() {
        let response = handler(ChatConfig::default(), WorkspaceConfig::default())
            .handle("list emails", "")
            .await
            .unwrap();
        assert_eq!(response.provider, "openai");
        assert!(response.reply.starts_with("Found 0 email(s)."));
        assert!(response.action.unwrap().warning.is_some());
    }

    #[tokio::test]
    async fn test_plain_chat_goes_to_provider() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"role": "assistant", "content": "Hi!"}}]
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let chat = ChatConfig {
            openai_api_key: "sk-test".into(),
            openai_model: "gpt-4o-mini".into(),
            openai_api_base: mock_server.uri(),
            ..Default::default()
        };
        let response = handler(chat, WorkspaceConfig::default())
            .handle("  hello there  ", "openai")
            .await
            .unwrap();

        assert_eq!(response.reply, "Hi!");
        assert!(response.action.is_none());
        let json = serde_json::to_value(&response).unwrap();
        assert!(json.get("action").is_none());
    }

    #[tokio::test]
    async fn test_plain_chat_missing_model() {
        let chat = ChatConfig {
            openai_api_key: "sk-test".into(),
            ..Default::default()
        };
        let err = handler(chat, WorkspaceConfig::default())
            .handle("hello", "openai")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "OPENAI_MODEL is not set.");
    }
}
