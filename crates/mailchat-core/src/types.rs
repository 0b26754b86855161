//! Core result types returned by workspace actions and chat dispatch.
//!
//! `ActionResult` is serialized directly as an HTTP response body, so absent
//! fields are skipped rather than emitted as `null`.

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────
// Action results
// ─────────────────────────────────────────────

/// Outcome tag carried by every `ActionResult`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionStatus {
    /// Accepted by the placeholder integration, not actually delivered.
    Queued,
    Sent,
    Deleted,
    Listed,
    Error,
}

impl ActionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionStatus::Queued => "queued",
            ActionStatus::Sent => "sent",
            ActionStatus::Deleted => "deleted",
            ActionStatus::Listed => "listed",
            ActionStatus::Error => "error",
        }
    }
}

/// One row of a mailbox listing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailSummary {
    pub id: String,
    pub from: String,
    pub subject: String,
    pub snippet: String,
}

/// Structured outcome of a workspace action.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActionResult {
    pub status: ActionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emails: Option<Vec<EmailSummary>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ActionResult {
    fn with_status(status: ActionStatus) -> Self {
        Self {
            status,
            message: None,
            message_id: None,
            to: None,
            emails: None,
            query: None,
            warning: None,
            detail: None,
        }
    }

    /// `{status: "error", message}`.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::with_status(ActionStatus::Error)
        }
    }

    /// `{status: "error", message, detail}` for upstream failures.
    pub fn upstream_error(message: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            detail: Some(detail.into()),
            ..Self::error(message)
        }
    }

    /// Placeholder acceptance: `{status: "queued", message, to}`.
    pub fn queued(to: impl Into<String>) -> Self {
        Self {
            message: Some("Email queued for delivery.".to_string()),
            to: Some(to.into()),
            ..Self::with_status(ActionStatus::Queued)
        }
    }

    /// `{status: "sent", message_id, to}`.
    pub fn sent(message_id: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            message_id: Some(message_id.into()),
            to: Some(to.into()),
            ..Self::with_status(ActionStatus::Sent)
        }
    }

    /// `{status: "deleted", message_id}`.
    pub fn deleted(message_id: impl Into<String>) -> Self {
        Self {
            message_id: Some(message_id.into()),
            ..Self::with_status(ActionStatus::Deleted)
        }
    }

    /// `{status: "listed", emails, query}`.
    pub fn listed(emails: Vec<EmailSummary>, query: impl Into<String>) -> Self {
        Self {
            emails: Some(emails),
            query: Some(query.into()),
            ..Self::with_status(ActionStatus::Listed)
        }
    }

    /// Attach a non-fatal warning.
    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warning = Some(warning.into());
        self
    }

    /// Attach an (often empty) email list, used by failed listings.
    pub fn with_emails(mut self, emails: Vec<EmailSummary>) -> Self {
        self.emails = Some(emails);
        self
    }

    pub fn is_error(&self) -> bool {
        self.status == ActionStatus::Error
    }

    /// One-line human summary, used as the chat reply for email intents.
    pub fn summary(&self) -> String {
        match self.status {
            ActionStatus::Queued => format!(
                "Email to {} queued for delivery.",
                self.to.as_deref().unwrap_or("recipient")
            ),
            ActionStatus::Sent => format!(
                "Email sent to {} (id {}).",
                self.to.as_deref().unwrap_or("recipient"),
                self.message_id.as_deref().unwrap_or("?")
            ),
            ActionStatus::Deleted => format!(
                "Email {} deleted.",
                self.message_id.as_deref().unwrap_or("?")
            ),
            ActionStatus::Listed => {
                let count = self.emails.as_ref().map_or(0, |e| e.len());
                let mut line = format!("Found {} email(s).", count);
                if let Some(ref warning) = self.warning {
                    line.push(' ');
                    line.push_str(warning);
                }
                line
            }
            ActionStatus::Error => {
                let mut line = self
                    .message
                    .clone()
                    .unwrap_or_else(|| "Email action failed.".to_string());
                if let Some(ref detail) = self.detail {
                    line.push_str(&format!(" ({})", detail));
                }
                line
            }
        }
    }
}

// ─────────────────────────────────────────────
// Chat replies
// ─────────────────────────────────────────────

/// Normalized reply from a chat provider.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatReply {
    /// `"openai"` or `"gemini"`.
    pub provider: String,
    pub reply: String,
}

impl ChatReply {
    pub fn new(provider: impl Into<String>, reply: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            reply: reply.into(),
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
