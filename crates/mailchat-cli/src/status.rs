//! `mailchat status`: show configuration and provider status.

use std::path::Path;

use anyhow::Result;
use colored::Colorize;

use mailchat_core::config::{
    resolve_chat_config, resolve_oauth_config, resolve_server_config, resolve_workspace_config,
};
use mailchat_providers::ProviderKind;
use mailchat_workspace::CredentialMode;

use crate::helpers::mark;

/// Run the status command.
pub fn run() -> Result<()> {
    let chat = resolve_chat_config();
    let workspace = resolve_workspace_config();
    let oauth = resolve_oauth_config();
    let server = resolve_server_config();

    println!();
    println!("{}", "✉ Mailchat Status".cyan().bold());
    println!();

    println!(
        "  {:<18} http://{}:{}",
        "Server:".bold(),
        server.host,
        server.port
    );
    let static_ok = Path::new(&server.static_dir).is_dir();
    println!(
        "  {:<18} {}",
        "Static dir:".bold(),
        mark(static_ok, &server.static_dir)
    );

    // Chat providers
    println!();
    println!("  {}", "Providers:".bold());
    for kind in [ProviderKind::OpenAi, ProviderKind::Gemini] {
        let status = match kind.validate(&chat) {
            Ok(()) => {
                let (_, model, _) = kind.settings(&chat);
                mark(true, &format!("key set, model {}", model))
            }
            Err(e) => mark(false, &e.to_string()),
        };
        println!("    {:<20} {}", kind.display_name(), status);
    }

    // Workspace
    println!();
    let mode = CredentialMode::select(&workspace, &oauth);
    let mode_line = match mode {
        CredentialMode::OAuth => mark(true, "OAuth (real Gmail calls)"),
        CredentialMode::ServiceAccount => mark(true, "service account (placeholder results)"),
        CredentialMode::None => mark(false, "not configured"),
    };
    println!("  {:<18} {}", "Workspace:".bold(), mode_line);

    if mode == CredentialMode::OAuth {
        let token_cached = Path::new(&oauth.token_file).exists();
        let label = if token_cached {
            format!("{} (cached)", oauth.token_file)
        } else {
            format!("{} (run `mailchat auth`)", oauth.token_file)
        };
        println!("  {:<18} {}", "Token file:".bold(), mark(token_cached, &label));
    }

    println!();
    Ok(())
}
