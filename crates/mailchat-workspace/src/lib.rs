//! Mailchat Workspace: email actions against a Gmail-compatible API.
//!
//! This crate provides:
//! - **executor**: `WorkspaceExecutor`: credential-mode selection and the
//!   send / delete / list actions, always returning an `ActionResult`
//! - **token**: `TokenStore`: the JSON token cache on disk
//! - **oauth**: `OAuthClient`: refresh, code exchange, and the interactive
//!   installed-app flow with a bounded wait
//! - **gmail**: `GmailClient`: thin REST client for the four Gmail calls used

pub mod error;
pub mod executor;
pub mod gmail;
pub mod oauth;
pub mod token;

pub use error::WorkspaceError;
pub use executor::{CredentialMode, WorkspaceExecutor};
pub use gmail::GmailClient;
pub use oauth::OAuthClient;
pub use token::{StoredToken, TokenStore};
