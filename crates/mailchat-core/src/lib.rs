//! Mailchat core: configuration, shared result types, and the error taxonomy.
//!
//! Every other crate in the workspace depends on this one:
//! - **config**: typed views of the process environment, re-read per request
//! - **types**: `ActionResult`, `EmailSummary`, `ChatReply`
//! - **error**: `ChatError`, the chat-path failure enum mapped to HTTP statuses

pub mod config;
pub mod error;
pub mod types;

pub use config::{ChatConfig, OAuthConfig, ServerConfig, WorkspaceConfig};
pub use error::ChatError;
pub use types::{ActionResult, ActionStatus, ChatReply, EmailSummary};
