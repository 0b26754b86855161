//! Configuration system: schema and environment resolution.
//!
//! Nothing here is cached: callers resolve a fresh snapshot for every request.
//!
//! # Usage
//! ```no_run
//! use mailchat_core::config;
//!
//! let chat = config::resolve_chat_config();
//! println!("OpenAI ready: {}", chat.openai_ready());
//! ```

pub mod loader;
pub mod schema;

// Re-export key types
pub use loader::{
    resolve_chat_config, resolve_oauth_config, resolve_server_config, resolve_workspace_config,
};
pub use schema::{ChatConfig, OAuthConfig, ServerConfig, WorkspaceConfig};
