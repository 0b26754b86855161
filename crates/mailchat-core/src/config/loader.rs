//! Config resolver: reads the process environment into typed snapshots.
//!
//! # Precedence
//! 1. Defaults (from each struct's `Default`)
//! 2. Environment variables (override defaults)
//!
//! Resolution never fails. A numeric variable that does not parse is logged
//! and the default is kept.

use std::str::FromStr;

use tracing::warn;

use super::schema::{ChatConfig, OAuthConfig, ServerConfig, WorkspaceConfig};

// Chat providers
pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const OPENAI_MODEL: &str = "OPENAI_MODEL";
pub const OPENAI_API_BASE: &str = "OPENAI_API_BASE";
pub const GEMINI_API_KEY: &str = "GEMINI_API_KEY";
pub const GEMINI_MODEL: &str = "GEMINI_MODEL";
pub const GEMINI_API_BASE: &str = "GEMINI_API_BASE";

// Workspace (service account)
pub const WORKSPACE_CLIENT_EMAIL: &str = "GOOGLE_WORKSPACE_CLIENT_EMAIL";
pub const WORKSPACE_PRIVATE_KEY: &str = "GOOGLE_WORKSPACE_PRIVATE_KEY";
pub const WORKSPACE_DELEGATED_USER: &str = "GOOGLE_WORKSPACE_DELEGATED_USER";
pub const GMAIL_API_BASE: &str = "GMAIL_API_BASE";

// OAuth
pub const OAUTH_CLIENT_ID: &str = "GOOGLE_OAUTH_CLIENT_ID";
pub const OAUTH_CLIENT_SECRET: &str = "GOOGLE_OAUTH_CLIENT_SECRET";
pub const OAUTH_TOKEN_FILE: &str = "GOOGLE_OAUTH_TOKEN_FILE";
pub const OAUTH_AUTH_URI: &str = "GOOGLE_OAUTH_AUTH_URI";
pub const OAUTH_TOKEN_URI: &str = "GOOGLE_OAUTH_TOKEN_URI";
pub const OAUTH_REDIRECT_PORT: &str = "GOOGLE_OAUTH_REDIRECT_PORT";
pub const OAUTH_TIMEOUT_SECS: &str = "GOOGLE_OAUTH_TIMEOUT_SECS";

// Server
pub const SERVER_HOST: &str = "MAILCHAT_HOST";
pub const SERVER_PORT: &str = "MAILCHAT_PORT";
pub const SERVER_STATIC_DIR: &str = "MAILCHAT_STATIC_DIR";

/// Read chat-provider credentials from the environment.
pub fn resolve_chat_config() -> ChatConfig {
    chat_config_from(&env_lookup)
}

/// Read service-account workspace credentials from the environment.
pub fn resolve_workspace_config() -> WorkspaceConfig {
    workspace_config_from(&env_lookup)
}

/// Read OAuth client settings from the environment.
pub fn resolve_oauth_config() -> OAuthConfig {
    oauth_config_from(&env_lookup)
}

/// Read the HTTP listen address and static directory from the environment.
pub fn resolve_server_config() -> ServerConfig {
    server_config_from(&env_lookup)
}

fn env_lookup(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

fn chat_config_from(lookup: &dyn Fn(&str) -> Option<String>) -> ChatConfig {
    let mut config = ChatConfig::default();
    override_string(&mut config.openai_api_key, lookup, OPENAI_API_KEY);
    override_string(&mut config.openai_model, lookup, OPENAI_MODEL);
    override_string(&mut config.openai_api_base, lookup, OPENAI_API_BASE);
    override_string(&mut config.gemini_api_key, lookup, GEMINI_API_KEY);
    override_string(&mut config.gemini_model, lookup, GEMINI_MODEL);
    override_string(&mut config.gemini_api_base, lookup, GEMINI_API_BASE);
    config
}

fn workspace_config_from(lookup: &dyn Fn(&str) -> Option<String>) -> WorkspaceConfig {
    let mut config = WorkspaceConfig::default();
    override_string(&mut config.client_email, lookup, WORKSPACE_CLIENT_EMAIL);
    override_string(&mut config.private_key, lookup, WORKSPACE_PRIVATE_KEY);
    override_string(&mut config.delegated_user, lookup, WORKSPACE_DELEGATED_USER);
    override_string(&mut config.gmail_api_base, lookup, GMAIL_API_BASE);
    config
}

fn oauth_config_from(lookup: &dyn Fn(&str) -> Option<String>) -> OAuthConfig {
    let mut config = OAuthConfig::default();
    override_string(&mut config.client_id, lookup, OAUTH_CLIENT_ID);
    override_string(&mut config.client_secret, lookup, OAUTH_CLIENT_SECRET);
    override_string(&mut config.token_file, lookup, OAUTH_TOKEN_FILE);
    override_string(&mut config.auth_uri, lookup, OAUTH_AUTH_URI);
    override_string(&mut config.token_uri, lookup, OAUTH_TOKEN_URI);
    override_parsed(&mut config.redirect_port, lookup, OAUTH_REDIRECT_PORT);
    override_parsed(&mut config.auth_timeout_secs, lookup, OAUTH_TIMEOUT_SECS);
    config
}

fn server_config_from(lookup: &dyn Fn(&str) -> Option<String>) -> ServerConfig {
    let mut config = ServerConfig::default();
    override_string(&mut config.host, lookup, SERVER_HOST);
    override_parsed(&mut config.port, lookup, SERVER_PORT);
    override_string(&mut config.static_dir, lookup, SERVER_STATIC_DIR);
    config
}

/// Replace `field` with the variable's value when it is set.
///
/// Credentials keep an explicitly empty value (it still means "unset").
/// Paths and URLs with a default keep the default when the variable is empty.
fn override_string(field: &mut String, lookup: &dyn Fn(&str) -> Option<String>, name: &str) {
    if let Some(val) = lookup(name) {
        if val.is_empty() && !field.is_empty() {
            return;
        }
        *field = val;
    }
}

fn override_parsed<T: FromStr>(field: &mut T, lookup: &dyn Fn(&str) -> Option<String>, name: &str) {
    if let Some(val) = lookup(name) {
        match val.trim().parse::<T>() {
            Ok(parsed) => *field = parsed,
            Err(_) => warn!(var = name, value = %val, "ignoring unparseable environment value"),
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_chat_config_empty_env() {
        let config = chat_config_from(&lookup_from(&[]));
        assert!(config.openai_api_key.is_empty());
        assert!(config.gemini_model.is_empty());
        assert_eq!(config.openai_api_base, "https://api.openai.com/v1");
    }

    #[test]
    fn test_chat_config_reads_all_fields() {
        let config = chat_config_from(&lookup_from(&[
            ("OPENAI_API_KEY", "sk-abc"),
            ("OPENAI_MODEL", "gpt-4o-mini"),
            ("GEMINI_API_KEY", "gm-key"),
            ("GEMINI_MODEL", "gemini-1.5-flash"),
            ("GEMINI_API_BASE", "http://localhost:9999"),
        ]));
        assert_eq!(config.openai_api_key, "sk-abc");
        assert_eq!(config.openai_model, "gpt-4o-mini");
        assert_eq!(config.gemini_api_key, "gm-key");
        assert_eq!(config.gemini_model, "gemini-1.5-flash");
        assert_eq!(config.gemini_api_base, "http://localhost:9999");
        assert!(config.openai_ready());
        assert!(config.gemini_ready());
    }

    #[test]
    fn test_workspace_config() {
        let config = workspace_config_from(&lookup_from(&[
            ("GOOGLE_WORKSPACE_CLIENT_EMAIL", "svc@example.iam"),
            ("GOOGLE_WORKSPACE_PRIVATE_KEY", "pk"),
            ("GOOGLE_WORKSPACE_DELEGATED_USER", "boss@example.com"),
        ]));
        assert!(config.has_credentials());
        assert_eq!(config.gmail_api_base, "https://gmail.googleapis.com/gmail/v1");
    }

    #[test]
    fn test_oauth_token_file_default() {
        let config = oauth_config_from(&lookup_from(&[]));
        assert_eq!(config.token_file, "token.json");

        let config = oauth_config_from(&lookup_from(&[("GOOGLE_OAUTH_TOKEN_FILE", "")]));
        assert_eq!(config.token_file, "token.json");

        let config =
            oauth_config_from(&lookup_from(&[("GOOGLE_OAUTH_TOKEN_FILE", "/tmp/tok.json")]));
        assert_eq!(config.token_file, "/tmp/tok.json");
    }

    #[test]
    fn test_oauth_numeric_overrides() {
        let config = oauth_config_from(&lookup_from(&[
            ("GOOGLE_OAUTH_CLIENT_ID", "id"),
            ("GOOGLE_OAUTH_CLIENT_SECRET", "secret"),
            ("GOOGLE_OAUTH_REDIRECT_PORT", "9090"),
            ("GOOGLE_OAUTH_TIMEOUT_SECS", "not-a-number"),
        ]));
        assert!(config.is_configured());
        assert_eq!(config.redirect_port, 9090);
        assert_eq!(config.auth_timeout_secs, 300);
    }

    #[test]
    fn test_server_config_overrides() {
        let config = server_config_from(&lookup_from(&[
            ("MAILCHAT_HOST", "0.0.0.0"),
            ("MAILCHAT_PORT", "3000"),
        ]));
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.static_dir, "static");
    }

    #[test]
    fn test_resolve_reads_process_env() {
        // Only variable not read by any other test in this crate.
        std::env::set_var("MAILCHAT_STATIC_DIR", "/srv/mailchat/static");
        let config = resolve_server_config();
        assert_eq!(config.static_dir, "/srv/mailchat/static");
        std::env::remove_var("MAILCHAT_STATIC_DIR");
    }
}
