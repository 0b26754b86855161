//! Mailchat Agent: turns one chat message into a reply.
//!
//! This crate contains:
//! - **intent**: the command-language parser (send / delete / list email)
//! - **handler**: `ChatHandler`, which runs a parsed email intent through the
//!   workspace executor or forwards the message to a chat provider

pub mod handler;
pub mod intent;

pub use handler::{ChatHandler, ChatResponse};
pub use intent::{parse_intent, ParsedIntent};
