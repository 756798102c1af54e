//! Thread Command

use anyhow::{Context, Result};
use murmur_core::Conversation;

use super::resolve_user;
use crate::config::CliConfig;
use crate::display;

/// Shows the conversation with a user, optionally with older pages.
pub async fn show(config: &CliConfig, handle: &str, older: u32) -> Result<()> {
    let rest = config.rest()?;
    let peer = resolve_user(&rest, handle).await?;

    let mut conversation = Conversation::new(peer.id.clone(), &config.client);
    conversation
        .load(&rest)
        .await
        .context("Failed to load messages")?;
    for _ in 0..older {
        let added = conversation
            .load_older(&rest)
            .await
            .context("Failed to load older messages")?;
        if added == 0 {
            break;
        }
    }

    let view = conversation.view();
    if view.is_empty() {
        display::info(&format!("No messages with @{} yet.", peer.username));
        return Ok(());
    }

    println!();
    println!("Conversation with {}:", peer.label());
    println!();
    for entry in view.entries() {
        display::display_thread_entry(entry, &peer.id);
    }
    println!();

    Ok(())
}
