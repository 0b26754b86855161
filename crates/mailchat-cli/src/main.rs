//! Mailchat CLI: entry point.
//!
//! # Commands
//!
//! - `mailchat serve [--host H] [--port P]`: run the HTTP server
//! - `mailchat chat -m MESSAGE [-p PROVIDER]`: one chat turn
//! - `mailchat email send|delete|list`: one workspace action
//! - `mailchat auth`: authorize Gmail access and cache the token
//! - `mailchat status`: show which providers and credentials are configured

mod commands;
mod helpers;
mod server;
mod status;

use anyhow::Result;
use clap::{Parser, Subcommand};

// ─────────────────────────────────────────────
// CLI definition
// ─────────────────────────────────────────────

/// Mailchat: chat with a language model and manage Gmail from one place
#[derive(Parser)]
#[command(name = "mailchat", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the web chat server
    Serve {
        /// Listen host (overrides MAILCHAT_HOST)
        #[arg(long)]
        host: Option<String>,

        /// Listen port (overrides MAILCHAT_PORT)
        #[arg(short, long)]
        port: Option<u16>,

        /// Enable debug logging
        #[arg(long, default_value_t = false)]
        logs: bool,
    },

    /// Send one message through the chat handler
    Chat {
        /// Message text; email commands are executed instead of sent to a model
        #[arg(short, long)]
        message: String,

        /// Chat provider: "openai" or "gemini"
        #[arg(short, long, default_value = "openai")]
        provider: String,

        /// Enable debug logging
        #[arg(long, default_value_t = false)]
        logs: bool,
    },

    /// Run a single email action and print the JSON result
    Email {
        #[command(subcommand)]
        action: commands::EmailCommands,
    },

    /// Authorize Gmail access and cache the OAuth token
    Auth,

    /// Show configuration status
    Status,
}

// ─────────────────────────────────────────────
// Entrypoint
// ─────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { host, port, logs } => {
            init_logging(logs);
            server::run(host, port).await
        }
        Commands::Chat {
            message,
            provider,
            logs,
        } => {
            init_logging(logs);
            commands::chat(&message, &provider).await
        }
        Commands::Email { action } => {
            init_logging(false);
            commands::email(action).await
        }
        Commands::Auth => {
            init_logging(false);
            commands::auth().await
        }
        Commands::Status => status::run(),
    }
}

/// Initialize tracing/logging. `RUST_LOG` wins when set.
fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let default_filter = if verbose {
        "mailchat=debug,mailchat_core=debug,mailchat_agent=debug,mailchat_providers=debug,mailchat_workspace=debug,info"
    } else {
        "warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}
