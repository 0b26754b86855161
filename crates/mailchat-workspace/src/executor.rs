//! Workspace action executor.
//!
//! Each action validates its input, picks a credential mode, and returns an
//! `ActionResult`. Failures never escape as `Err`: they become results with
//! `status: "error"`.

use mailchat_core::config::{resolve_oauth_config, resolve_workspace_config};
use mailchat_core::{ActionResult, EmailSummary, OAuthConfig, WorkspaceConfig};
use tracing::{error, info, warn};

use crate::error::WorkspaceError;
use crate::gmail::GmailClient;
use crate::oauth::OAuthClient;
use crate::token::TokenStore;

const MSG_SEND_REQUIRED: &str = "to, subject, and body are required.";
const MSG_ID_REQUIRED: &str = "message_id is required.";
const MSG_NOT_CONFIGURED: &str = "Google Workspace credentials are not configured.";
const MSG_GMAIL_ERROR: &str = "Gmail API error.";

/// Which credentials govern an action. First satisfied wins.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CredentialMode {
    /// Interactive OAuth with a cached token; real Gmail calls.
    OAuth,
    /// Service-account fields present; placeholder results, no network.
    ServiceAccount,
    None,
}

impl CredentialMode {
    pub fn select(workspace: &WorkspaceConfig, oauth: &OAuthConfig) -> Self {
        if oauth.is_configured() {
            CredentialMode::OAuth
        } else if workspace.has_credentials() {
            CredentialMode::ServiceAccount
        } else {
            CredentialMode::None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CredentialMode::OAuth => "oauth",
            CredentialMode::ServiceAccount => "service-account",
            CredentialMode::None => "none",
        }
    }
}

/// Runs email actions against one configuration snapshot.
#[derive(Clone, Debug)]
pub struct WorkspaceExecutor {
    workspace: WorkspaceConfig,
    oauth: OAuthConfig,
}

impl WorkspaceExecutor {
    pub fn new(workspace: WorkspaceConfig, oauth: OAuthConfig) -> Self {
        Self { workspace, oauth }
    }

    /// Snapshot the current environment. Call once per request.
    pub fn from_env() -> Self {
        Self::new(resolve_workspace_config(), resolve_oauth_config())
    }

    pub fn mode(&self) -> CredentialMode {
        CredentialMode::select(&self.workspace, &self.oauth)
    }

    pub async fn send_email(&self, to: &str, subject: &str, body: &str) -> ActionResult {
        let (to, subject, body) = (to.trim(), subject.trim(), body.trim());
        if to.is_empty() || subject.is_empty() || body.is_empty() {
            return ActionResult::error(MSG_SEND_REQUIRED);
        }

        match self.mode() {
            CredentialMode::OAuth => {
                let outcome = async {
                    let gmail = self.gmail_client().await?;
                    gmail.send_message(to, subject, body).await
                }
                .await;
                match outcome {
                    Ok(id) => {
                        info!(to = %to, message_id = %id, "email sent");
                        ActionResult::sent(id, to)
                    }
                    Err(e) => gmail_failure("send", e),
                }
            }
            CredentialMode::ServiceAccount => {
                info!(to = %to, "email queued (service-account placeholder)");
                ActionResult::queued(to)
            }
            CredentialMode::None => ActionResult::error(MSG_NOT_CONFIGURED),
        }
    }

    pub async fn delete_email(&self, message_id: &str) -> ActionResult {
        let message_id = message_id.trim();
        if message_id.is_empty() {
            return ActionResult::error(MSG_ID_REQUIRED);
        }

        match self.mode() {
            CredentialMode::OAuth => {
                let outcome = async {
                    let gmail = self.gmail_client().await?;
                    gmail.delete_message(message_id).await
                }
                .await;
                match outcome {
                    Ok(()) => {
                        info!(message_id = %message_id, "email deleted");
                        ActionResult::deleted(message_id)
                    }
                    Err(e) => gmail_failure("delete", e),
                }
            }
            CredentialMode::ServiceAccount => ActionResult::deleted(message_id),
            CredentialMode::None => ActionResult::error(MSG_NOT_CONFIGURED),
        }
    }

    /// List recent mail. Without credentials this still succeeds, with a
    /// warning and no emails.
    pub async fn list_emails(&self, query: Option<&str>) -> ActionResult {
        let query = query.map(str::trim).unwrap_or_default();

        match self.mode() {
            CredentialMode::OAuth => {
                let outcome = async {
                    let gmail = self.gmail_client().await?;
                    gmail.list_messages(query).await
                }
                .await;
                match outcome {
                    Ok(emails) => {
                        info!(query = %query, count = emails.len(), "emails listed");
                        ActionResult::listed(emails, query)
                    }
                    Err(e) => gmail_failure("list", e).with_emails(Vec::new()),
                }
            }
            CredentialMode::ServiceAccount => ActionResult::listed(vec![sample_email()], query),
            CredentialMode::None => {
                warn!("list requested without workspace credentials");
                ActionResult::listed(Vec::new(), query).with_warning(MSG_NOT_CONFIGURED)
            }
        }
    }

    async fn gmail_client(&self) -> Result<GmailClient, WorkspaceError> {
        let store = TokenStore::new(&self.oauth.token_file);
        let token = OAuthClient::new(self.oauth.clone()).acquire(&store).await?;
        Ok(GmailClient::new(&self.workspace.gmail_api_base, &token.token))
    }
}

fn gmail_failure(action: &str, e: WorkspaceError) -> ActionResult {
    error!(action = action, error = %e, "Gmail action failed");
    ActionResult::upstream_error(MSG_GMAIL_ERROR, e.to_string())
}

fn sample_email() -> EmailSummary {
    EmailSummary {
        id: "sample-123".to_string(),
        from: "demo@example.com".to_string(),
        subject: "Welcome to Workspace MCP".to_string(),
        snippet: "Replace this with a real Gmail API call.".to_string(),
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
