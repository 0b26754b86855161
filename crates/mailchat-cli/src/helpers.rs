//! Shared CLI helpers: reply and JSON printing.

use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;

/// Print a chat reply to stdout.
pub fn print_response(provider: &str, reply: &str) {
    println!();
    println!("{}", format!("✉ Mailchat ({})", provider).cyan().bold());
    if reply.is_empty() {
        println!("{}", "(no response)".dimmed());
    } else {
        println!("{reply}");
    }
    println!();
}

/// Pretty-print any serializable value as JSON.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("failed to serialize result")?;
    println!("{text}");
    Ok(())
}

/// `✓ label` or `· label`, for status lines.
pub fn mark(ok: bool, label: &str) -> String {
    if ok {
        format!("{} {}", "✓".green(), label)
    } else {
        format!("{}", format!("· {}", label).dimmed())
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
