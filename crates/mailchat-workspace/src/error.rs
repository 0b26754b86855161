//! Errors raised inside the workspace crate.
//!
//! None of these reach HTTP clients directly: the executor folds them into an
//! `ActionResult` with `status: "error"` and the error text as `detail`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkspaceError {
    /// Transport failure talking to Gmail or the OAuth endpoints.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx response from the Gmail API.
    #[error("HTTP {status}: {message}")]
    Api { status: u16, message: String },

    #[error("failed to access token file '{path}': {source}")]
    TokenIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse token file '{path}': {source}")]
    TokenParse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// Refresh or code exchange rejected by the token endpoint.
    #[error("token request failed: {0}")]
    TokenRequest(String),

    /// The interactive flow failed (denied consent, bad redirect, bind error).
    #[error("authorization failed: {0}")]
    Authorization(String),

    #[error("authorization timed out after {0}s")]
    AuthorizationTimeout(u64),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl WorkspaceError {
    /// Build an `Api` error from a Gmail error body.
    ///
    /// Google wraps errors as `{"error": {"code", "message", ...}}`; the
    /// inner message is used when present, else the raw body.
    pub fn from_api_body(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| v["error"]["message"].as_str().map(String::from))
            .unwrap_or_else(|| body.trim().to_string());
        WorkspaceError::Api { status, message }
    }
}
