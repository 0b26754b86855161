//! Google OAuth 2.0 for the installed-app flow.
//!
//! `OAuthClient::acquire` is the only entry point the executor uses:
//! load the cached token, refresh it if it expired, or run the interactive
//! flow. A refreshed or newly created token is written back to the store
//! before it is returned, and a failed write is an error.

use std::time::Duration;

use chrono::Utc;
use mailchat_core::OAuthConfig;
use serde::Deserialize;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, info, warn};
use url::Url;

use crate::error::WorkspaceError;
use crate::token::{StoredToken, TokenStore};

/// Scopes requested for send + delete + list.
pub const GMAIL_SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/gmail.send",
    "https://www.googleapis.com/auth/gmail.modify",
];

/// Timeout for token endpoint calls.
const TOKEN_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Largest redirect request we read from the browser.
const MAX_REDIRECT_REQUEST_BYTES: usize = 16 * 1024;

/// How long one redirect connection may take to send its request line.
const REDIRECT_READ_TIMEOUT: Duration = Duration::from_secs(5);

const SUCCESS_PAGE: &str =
    "The authentication flow has completed. You may close this window.";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    scope: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

/// OAuth client bound to one `OAuthConfig` snapshot.
pub struct OAuthClient {
    client: reqwest::Client,
    config: OAuthConfig,
    /// Fixed `state` nonce; a fresh one per flow when `None`.
    state: Option<String>,
}

impl OAuthClient {
    pub fn new(config: OAuthConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(TOKEN_REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            client,
            config,
            state: None,
        }
    }

    #[cfg(test)]
    fn with_state(mut self, state: &str) -> Self {
        self.state = Some(state.to_string());
        self
    }

    pub fn config(&self) -> &OAuthConfig {
        &self.config
    }

    /// Return a usable token, refreshing or authorizing as needed.
    pub async fn acquire(&self, store: &TokenStore) -> Result<StoredToken, WorkspaceError> {
        let cached = store.load()?;

        if let Some(ref token) = cached {
            if token.is_valid() {
                debug!("using cached OAuth token");
                return Ok(token.clone());
            }
        }

        let fresh = match cached {
            Some(token) if token.can_refresh() => match self.refresh(&token).await {
                Ok(refreshed) => {
                    info!("refreshed OAuth access token");
                    refreshed
                }
                Err(e) => {
                    warn!(error = %e, "token refresh failed, starting interactive authorization");
                    self.run_interactive_flow().await?
                }
            },
            _ => self.run_interactive_flow().await?,
        };

        store.save(&fresh)?;
        Ok(fresh)
    }

    /// Build the consent URL the user opens in a browser.
    pub fn authorization_url(&self, state: &str) -> Result<Url, WorkspaceError> {
        let mut url = Url::parse(&self.config.auth_uri)?;
        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", &self.config.client_id)
            .append_pair("redirect_uri", &self.config.redirect_uri())
            .append_pair("scope", &GMAIL_SCOPES.join(" "))
            .append_pair("state", state)
            .append_pair("access_type", "offline")
            .append_pair("prompt", "consent");
        Ok(url)
    }

    /// Exchange the refresh token for a new access token.
    ///
    /// Google may omit `refresh_token` in the response; the old one is kept.
    pub async fn refresh(&self, token: &StoredToken) -> Result<StoredToken, WorkspaceError> {
        let refresh_token = token
            .refresh_token
            .as_deref()
            .ok_or_else(|| WorkspaceError::TokenRequest("no refresh token".to_string()))?;

        debug!("refreshing OAuth access token");
        let response = self
            .post_token_form(&[
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
                ("refresh_token", refresh_token),
                ("grant_type", "refresh_token"),
            ])
            .await?;

        let mut fresh = self.token_from_response(response);
        if fresh.refresh_token.is_none() {
            fresh.refresh_token = Some(refresh_token.to_string());
        }
        if fresh.scopes.is_empty() {
            fresh.scopes = token.scopes.clone();
        }
        Ok(fresh)
    }

    /// Trade an authorization code from the redirect for tokens.
    pub async fn exchange_code(&self, code: &str) -> Result<StoredToken, WorkspaceError> {
        let redirect_uri = self.config.redirect_uri();
        let response = self
            .post_token_form(&[
                ("code", code),
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
                ("redirect_uri", redirect_uri.as_str()),
                ("grant_type", "authorization_code"),
            ])
            .await?;
        Ok(self.token_from_response(response))
    }

    /// Run the browser consent flow and wait for the redirect.
    ///
    /// Blocks the calling request until the user finishes, the redirect
    /// reports an error, or `auth_timeout_secs` elapses.
    pub async fn run_interactive_flow(&self) -> Result<StoredToken, WorkspaceError> {
        let state = self
            .state
            .clone()
            .unwrap_or_else(|| uuid::Uuid::new_v4().simple().to_string());
        let url = self.authorization_url(&state)?;

        let listener = TcpListener::bind(("127.0.0.1", self.config.redirect_port))
            .await
            .map_err(|e| {
                WorkspaceError::Authorization(format!(
                    "cannot listen on port {}: {}",
                    self.config.redirect_port, e
                ))
            })?;

        warn!(
            url = %url,
            timeout_secs = self.config.auth_timeout_secs,
            "Google authorization required: open the URL in a browser"
        );

        let wait = Duration::from_secs(self.config.auth_timeout_secs);
        let code = tokio::time::timeout(wait, wait_for_code(&listener, &state, REDIRECT_READ_TIMEOUT))
            .await
            .map_err(|_| WorkspaceError::AuthorizationTimeout(self.config.auth_timeout_secs))??;

        info!("authorization code received, exchanging for tokens");
        self.exchange_code(&code).await
    }

    async fn post_token_form(&self, form: &[(&str, &str)]) -> Result<TokenResponse, WorkspaceError> {
        let response = self
            .client
            .post(&self.config.token_uri)
            .form(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let reason = serde_json::from_str::<TokenErrorResponse>(&body)
                .ok()
                .and_then(|e| e.error_description.or(e.error))
                .unwrap_or(body);
            warn!(status = %status, reason = %reason, "token endpoint rejected request");
            return Err(WorkspaceError::TokenRequest(format!(
                "HTTP {}: {}",
                status.as_u16(),
                reason
            )));
        }

        Ok(response.json::<TokenResponse>().await?)
    }

    fn token_from_response(&self, response: TokenResponse) -> StoredToken {
        let scopes = response
            .scope
            .map(|s| s.split_whitespace().map(String::from).collect())
            .unwrap_or_else(|| GMAIL_SCOPES.iter().map(|s| s.to_string()).collect());

        StoredToken {
            token: response.access_token,
            refresh_token: response.refresh_token,
            token_uri: self.config.token_uri.clone(),
            client_id: self.config.client_id.clone(),
            client_secret: self.config.client_secret.clone(),
            scopes,
            expiry: response
                .expires_in
                .map(|secs| Utc::now() + chrono::Duration::seconds(secs)),
        }
    }
}

// ─────────────────────────────────────────────
// Redirect listener
// ─────────────────────────────────────────────

/// What one redirect request carried.
#[derive(Debug, PartialEq, Eq)]
enum RedirectOutcome {
    Code(String),
    Denied(String),
    /// Unrelated request (favicon, wrong state); keep waiting.
    Ignored,
}

/// Accept connections until one carries the authorization code.
///
/// A connection that sends no request line within `read_timeout` is dropped
/// so it cannot hold up the real redirect.
async fn wait_for_code(
    listener: &TcpListener,
    state: &str,
    read_timeout: Duration,
) -> Result<String, WorkspaceError> {
    loop {
        let (mut stream, peer) = listener
            .accept()
            .await
            .map_err(|e| WorkspaceError::Authorization(format!("accept failed: {}", e)))?;
        debug!(peer = %peer, "redirect connection");

        let request_line =
            match tokio::time::timeout(read_timeout, read_request_line(&mut stream)).await {
                Ok(Ok(line)) => line,
                Ok(Err(e)) => {
                    debug!(error = %e, "could not read redirect request");
                    continue;
                }
                Err(_) => {
                    debug!(peer = %peer, "redirect connection sent nothing, dropping");
                    continue;
                }
            };

        match parse_redirect(&request_line, state) {
            RedirectOutcome::Code(code) => {
                respond(&mut stream, "200 OK", SUCCESS_PAGE).await;
                return Ok(code);
            }
            RedirectOutcome::Denied(reason) => {
                respond(&mut stream, "400 Bad Request", "Authorization was not granted.").await;
                return Err(WorkspaceError::Authorization(reason));
            }
            RedirectOutcome::Ignored => {
                respond(&mut stream, "404 Not Found", "").await;
            }
        }
    }
}

async fn read_request_line(stream: &mut TcpStream) -> std::io::Result<String> {
    let mut buf = Vec::with_capacity(1024);
    let mut chunk = [0u8; 1024];
    loop {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        if buf.windows(2).any(|w| w == b"\r\n") || buf.len() >= MAX_REDIRECT_REQUEST_BYTES {
            break;
        }
    }
    let text = String::from_utf8_lossy(&buf);
    Ok(text.lines().next().unwrap_or_default().to_string())
}

async fn respond(stream: &mut TcpStream, status: &str, body: &str) {
    let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: text/plain; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
    );
    if let Err(e) = stream.write_all(response.as_bytes()).await {
        debug!(error = %e, "failed to answer redirect");
    }
    let _ = stream.shutdown().await;
}

/// Interpret `GET /?code=...&state=... HTTP/1.1`.
fn parse_redirect(request_line: &str, expected_state: &str) -> RedirectOutcome {
    let mut parts = request_line.split_whitespace();
    let (Some("GET"), Some(target)) = (parts.next(), parts.next()) else {
        return RedirectOutcome::Ignored;
    };

    let Ok(url) = Url::parse(&format!("http://localhost{}", target)) else {
        return RedirectOutcome::Ignored;
    };

    let mut code = None;
    let mut state = None;
    let mut error = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "code" => code = Some(value.into_owned()),
            "state" => state = Some(value.into_owned()),
            "error" => error = Some(value.into_owned()),
            _ => {}
        }
    }

    if state.as_deref() != Some(expected_state) {
        return RedirectOutcome::Ignored;
    }
    if let Some(error) = error {
        return RedirectOutcome::Denied(error);
    }
    match code {
        Some(code) if !code.is_empty() => RedirectOutcome::Code(code),
        _ => RedirectOutcome::Ignored,
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
