//! Chat-path error taxonomy.
//!
//! Email actions never fail with an error: their failures are folded into an
//! `ActionResult`. Only the chat path raises, and every variant maps onto an
//! HTTP status the server can return.

use thiserror::Error;

/// Failure of a chat request before or during provider dispatch.
#[derive(Debug, Error)]
pub enum ChatError {
    /// The request carried no message text.
    #[error("Message is required.")]
    EmptyMessage,

    /// A required environment variable for the selected provider is empty.
    #[error("{0} is not set.")]
    MissingConfig(&'static str),

    /// Network failure or non-2xx status from the provider.
    #[error("{provider} request failed: {detail}")]
    Upstream { provider: &'static str, detail: String },

    /// 2xx response that does not have the expected reply shape.
    #[error("{provider} returned an unexpected response: {detail}")]
    MalformedResponse { provider: &'static str, detail: String },
}

impl ChatError {
    /// HTTP status the server should answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            ChatError::EmptyMessage | ChatError::MissingConfig(_) => 400,
            ChatError::Upstream { .. } | ChatError::MalformedResponse { .. } => 502,
        }
    }

    /// Message safe to show to the client.
    ///
    /// Upstream details stay in the logs; clients get a generic line.
    pub fn public_message(&self) -> String {
        match self {
            ChatError::Upstream { .. } | ChatError::MalformedResponse { .. } => {
                "Failed to get a response from the chat provider.".to_string()
            }
            other => other.to_string(),
        }
    }

    pub fn is_client_error(&self) -> bool {
        self.status_code() < 500
    }
}
