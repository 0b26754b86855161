//! Chat provider layer for Mailchat.
//!
//! # Architecture
//!
//! - [`traits::ChatProvider`]: trait both providers implement
//! - [`registry::ProviderKind`]: provider selection and per-provider env names
//! - [`http_provider::OpenAiProvider`]: OpenAI-compatible `/chat/completions` client
//! - [`gemini::GeminiProvider`]: Gemini `generateContent` client
//! - [`dispatch::dispatch_chat`]: validate config, call once, normalize the reply

pub mod dispatch;
pub mod gemini;
pub mod http_provider;
pub mod registry;
pub mod traits;

// Re-export main types for convenience
pub use dispatch::dispatch_chat;
pub use gemini::GeminiProvider;
pub use http_provider::OpenAiProvider;
pub use registry::{create_provider, ProviderKind};
pub use traits::{ChatProvider, LlmRequestConfig};
