//! `mailchat serve`: the HTTP surface.
//!
//! Routes:
//! - `GET  /`                  chat page
//! - `GET  /static/*`          files from the static directory
//! - `GET  /health`            liveness
//! - `POST /api/chat`          `{message, provider?}`
//! - `POST /api/email/send`    `{to, subject, body}`
//! - `POST /api/email/delete`  `{message_id}`
//! - `GET  /api/email/list`    `?query=`
//!
//! Every handler resolves configuration from the environment on each request.

use anyhow::{Context, Result};
use axum::extract::rejection::JsonRejection;
use axum::extract::Query;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use tower_http::services::ServeDir;
use tracing::{error, info, warn};

use mailchat_agent::{ChatHandler, ChatResponse};
use mailchat_core::config::resolve_server_config;
use mailchat_core::{ActionResult, ChatError};
use mailchat_workspace::WorkspaceExecutor;

const INDEX_HTML: &str = include_str!("../assets/index.html");

// ─────────────────────────────────────────────
// Request bodies (missing fields default to "")
// ─────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ChatRequest {
    message: String,
    provider: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SendRequest {
    to: String,
    subject: String,
    body: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DeleteRequest {
    message_id: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ListParams {
    query: Option<String>,
}

/// Failure answered as `{"error": ...}`.
enum ApiError {
    /// 400 or 502, per `ChatError::status_code`.
    Chat(ChatError),
    /// Body was not JSON or had fields of the wrong type.
    BadBody(JsonRejection),
}

impl From<ChatError> for ApiError {
    fn from(e: ChatError) -> Self {
        ApiError::Chat(e)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(e: JsonRejection) -> Self {
        ApiError::BadBody(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Chat(e) => {
                let status = StatusCode::from_u16(e.status_code())
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                if e.is_client_error() {
                    warn!(error = %e, "chat request rejected");
                } else {
                    error!(error = %e, "chat provider failed");
                }
                (status, e.public_message())
            }
            ApiError::BadBody(rejection) => {
                warn!(error = %rejection.body_text(), "malformed request body");
                (
                    StatusCode::BAD_REQUEST,
                    "Request body must be a JSON object with string fields.".to_string(),
                )
            }
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

// ─────────────────────────────────────────────
// Router
// ─────────────────────────────────────────────

pub fn router(static_dir: &str) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/api/chat", post(chat))
        .route("/api/email/send", post(email_send))
        .route("/api/email/delete", post(email_delete))
        .route("/api/email/list", get(email_list))
        .nest_service("/static", ServeDir::new(static_dir))
}

/// Bind and serve until Ctrl+C.
pub async fn run(host: Option<String>, port: Option<u16>) -> Result<()> {
    let mut config = resolve_server_config();
    if let Some(host) = host {
        config.host = host;
    }
    if let Some(port) = port {
        config.port = port;
    }

    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port))
        .await
        .with_context(|| format!("failed to bind {}:{}", config.host, config.port))?;

    info!(
        host = %config.host,
        port = config.port,
        static_dir = %config.static_dir,
        "mailchat server starting"
    );
    println!();
    println!("  Listening on http://{}:{}", config.host, config.port);
    println!("  Ctrl+C to stop");
    println!();

    axum::serve(listener, router(&config.static_dir))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    println!("  Server stopped. Goodbye!");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for Ctrl+C");
        return;
    }
    info!("received Ctrl+C, shutting down");
}

// ─────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn health() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

async fn chat(
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let Json(req) = body?;
    let response = ChatHandler::from_env()
        .handle(&req.message, &req.provider)
        .await?;
    Ok(Json(response))
}

async fn email_send(
    body: Result<Json<SendRequest>, JsonRejection>,
) -> Result<Json<ActionResult>, ApiError> {
    let Json(req) = body?;
    Ok(Json(
        WorkspaceExecutor::from_env()
            .send_email(&req.to, &req.subject, &req.body)
            .await,
    ))
}

async fn email_delete(
    body: Result<Json<DeleteRequest>, JsonRejection>,
) -> Result<Json<ActionResult>, ApiError> {
    let Json(req) = body?;
    Ok(Json(
        WorkspaceExecutor::from_env().delete_email(&req.message_id).await,
    ))
}

async fn email_list(Query(params): Query<ListParams>) -> Json<ActionResult> {
    Json(
        WorkspaceExecutor::from_env()
            .list_emails(params.query.as_deref())
            .await,
    )
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
