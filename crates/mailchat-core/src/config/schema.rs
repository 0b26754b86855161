//! Configuration schema: one struct per concern.
//!
//! Empty strings mean "unset". Absence is represented, never rejected here;
//! the consuming component decides what a missing value means.

use serde::{Deserialize, Serialize};

/// Default OpenAI-compatible API base.
pub const DEFAULT_OPENAI_API_BASE: &str = "https://api.openai.com/v1";

/// Default Gemini API base (generate-content lives under `models/`).
pub const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default Gmail REST base.
pub const DEFAULT_GMAIL_API_BASE: &str = "https://gmail.googleapis.com/gmail/v1";

/// Google OAuth authorization endpoint.
pub const DEFAULT_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/auth";

/// Google OAuth token endpoint.
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

// ─────────────────────────────────────────────
// Chat providers
// ─────────────────────────────────────────────

/// Credentials and models for the two chat providers.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChatConfig {
    pub openai_api_key: String,
    pub openai_model: String,
    /// Base URL of the OpenAI-compatible API (no trailing `/chat/completions`).
    pub openai_api_base: String,
    pub gemini_api_key: String,
    pub gemini_model: String,
    /// Base URL of the Gemini API (no trailing `/models/...`).
    pub gemini_api_base: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            openai_api_key: String::new(),
            openai_model: String::new(),
            openai_api_base: DEFAULT_OPENAI_API_BASE.to_string(),
            gemini_api_key: String::new(),
            gemini_model: String::new(),
            gemini_api_base: DEFAULT_GEMINI_API_BASE.to_string(),
        }
    }
}

impl ChatConfig {
    /// Whether both the OpenAI key and model are set.
    pub fn openai_ready(&self) -> bool {
        !self.openai_api_key.is_empty() && !self.openai_model.is_empty()
    }

    /// Whether both the Gemini key and model are set.
    pub fn gemini_ready(&self) -> bool {
        !self.gemini_api_key.is_empty() && !self.gemini_model.is_empty()
    }
}

// ─────────────────────────────────────────────
// Google Workspace (service account)
// ─────────────────────────────────────────────

/// Service-account style workspace credentials.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorkspaceConfig {
    pub client_email: String,
    pub private_key: String,
    pub delegated_user: String,
    /// Gmail REST base, overridable for tests and proxies.
    pub gmail_api_base: String,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            client_email: String::new(),
            private_key: String::new(),
            delegated_user: String::new(),
            gmail_api_base: DEFAULT_GMAIL_API_BASE.to_string(),
        }
    }
}

impl WorkspaceConfig {
    /// All three service-account fields are non-empty.
    pub fn has_credentials(&self) -> bool {
        !self.client_email.is_empty()
            && !self.private_key.is_empty()
            && !self.delegated_user.is_empty()
    }
}

// ─────────────────────────────────────────────
// Google OAuth (installed-app flow)
// ─────────────────────────────────────────────

/// Interactive OAuth client settings and the local token cache path.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    /// Path of the persisted token JSON.
    pub token_file: String,
    pub auth_uri: String,
    pub token_uri: String,
    /// Local port the authorization redirect lands on.
    pub redirect_port: u16,
    /// Upper bound on how long the interactive flow waits for the user.
    pub auth_timeout_secs: u64,
}

impl Default for OAuthConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            token_file: "token.json".to_string(),
            auth_uri: DEFAULT_AUTH_URI.to_string(),
            token_uri: DEFAULT_TOKEN_URI.to_string(),
            redirect_port: 8080,
            auth_timeout_secs: 300,
        }
    }
}

impl OAuthConfig {
    /// Client id and secret are both present.
    pub fn is_configured(&self) -> bool {
        !self.client_id.is_empty() && !self.client_secret.is_empty()
    }

    /// Redirect URI registered for the installed-app flow.
    pub fn redirect_uri(&self) -> String {
        format!("http://localhost:{}/", self.redirect_port)
    }
}

// ─────────────────────────────────────────────
// HTTP server
// ─────────────────────────────────────────────

/// Listen address and static asset directory for the HTTP surface.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub static_dir: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            static_dir: "static".to_string(),
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
