//! Inbox Commands

use anyhow::{Context, Result};
use murmur_core::InboxView;

use super::resolve_user;
use crate::config::CliConfig;
use crate::display;

/// Shows a user profile.
pub async fn user(config: &CliConfig, handle: &str) -> Result<()> {
    let rest = config.rest()?;
    let user = resolve_user(&rest, handle).await?;
    display::display_user(&user);
    Ok(())
}

/// Lists conversations, most recent first.
pub async fn list(config: &CliConfig, limit: Option<u32>) -> Result<()> {
    let rest = config.rest()?;
    let entries = rest.get_inbox(limit).await.context("Failed to load inbox")?;

    let mut inbox = InboxView::new();
    inbox.replace(entries);

    if inbox.is_empty() {
        display::info("No conversations yet. Start one with:");
        println!("  murmur send <handle> <message>");
        return Ok(());
    }

    println!();
    println!("Conversations ({}, {} unread):", inbox.len(), inbox.total_unread());
    println!();
    for entry in inbox.entries() {
        display::display_inbox_entry(entry);
    }
    println!();

    Ok(())
}
