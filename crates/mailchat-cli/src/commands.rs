//! One-shot commands: `chat`, `email ...`, `auth`.

use anyhow::{bail, Context, Result};
use clap::Subcommand;
use colored::Colorize;
use tracing::info;

use mailchat_agent::ChatHandler;
use mailchat_core::config::resolve_oauth_config;
use mailchat_workspace::{OAuthClient, TokenStore, WorkspaceExecutor};

use crate::helpers;

#[derive(Subcommand)]
pub enum EmailCommands {
    /// Send a plain-text email
    Send {
        #[arg(long)]
        to: String,
        #[arg(short, long)]
        subject: String,
        #[arg(short, long)]
        body: String,
    },

    /// Delete a message by id
    Delete {
        /// Gmail message id
        message_id: String,
    },

    /// List recent messages
    List {
        /// Gmail search query, e.g. "from:boss is:unread"
        #[arg(short, long)]
        query: Option<String>,
    },
}

/// `mailchat chat`: same path as `POST /api/chat`.
pub async fn chat(message: &str, provider: &str) -> Result<()> {
    let response = ChatHandler::from_env()
        .handle(message, provider)
        .await
        .context("chat request failed")?;

    helpers::print_response(&response.provider, &response.reply);
    if let Some(action) = response.action {
        helpers::print_json(&action)?;
    }
    Ok(())
}

/// `mailchat email ...`: print the `ActionResult` as JSON.
pub async fn email(action: EmailCommands) -> Result<()> {
    let executor = WorkspaceExecutor::from_env();
    info!(mode = executor.mode().as_str(), "running email command");

    let result = match action {
        EmailCommands::Send { to, subject, body } => {
            executor.send_email(&to, &subject, &body).await
        }
        EmailCommands::Delete { message_id } => executor.delete_email(&message_id).await,
        EmailCommands::List { query } => executor.list_emails(query.as_deref()).await,
    };

    helpers::print_json(&result)?;
    if result.is_error() {
        bail!("email action failed");
    }
    Ok(())
}

/// `mailchat auth`: run acquire/refresh/authorize now instead of on the
/// first email request.
pub async fn auth() -> Result<()> {
    let config = resolve_oauth_config();
    if !config.is_configured() {
        bail!("GOOGLE_OAUTH_CLIENT_ID and GOOGLE_OAUTH_CLIENT_SECRET must be set");
    }

    let store = TokenStore::new(&config.token_file);
    println!(
        "  {} waiting up to {}s for browser authorization if needed",
        "→".cyan(),
        config.auth_timeout_secs
    );

    let token = OAuthClient::new(config)
        .acquire(&store)
        .await
        .context("Gmail authorization failed")?;

    println!(
        "  {} token cached at {}",
        "✓".green(),
        store.path().display()
    );
    match token.expiry {
        Some(expiry) => println!("    expires {}", expiry.to_rfc3339().dimmed()),
        None => println!("    {}", "expiry unknown".dimmed()),
    }
    Ok(())
}
