//! Display Helpers
//!
//! Terminal output formatting and styling.

use chrono::{DateTime, Local, Utc};
use console::style;
use murmur_core::{InboxEntry, ThreadEntry, UserSummary};

/// Prints a success message.
pub fn success(msg: &str) {
    println!("{} {}", style("✓").green().bold(), msg);
}

/// Prints a warning message.
pub fn warning(msg: &str) {
    println!("{} {}", style("⚠").yellow().bold(), msg);
}

/// Prints an info message.
pub fn info(msg: &str) {
    println!("{} {}", style("ℹ").blue().bold(), msg);
}

fn short_time(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%b %d %H:%M").to_string()
}

/// Displays a user profile.
pub fn display_user(user: &UserSummary) {
    println!("  {}  {}", style(user.label()).bold().cyan(), style(format!("@{}", user.username)).dim());
    println!("  {:8} {}", style("id").dim(), user.id);
    if let Some(photo) = &user.profile_photo {
        println!("  {:8} {}", style("avatar").dim(), photo);
    }
}

/// Displays one inbox row.
pub fn display_inbox_entry(entry: &InboxEntry) {
    let when = entry
        .last_message_at
        .map(short_time)
        .unwrap_or_else(|| "-".to_string());
    let preview = entry.last_body.as_deref().unwrap_or("(no messages)");
    let unread = if entry.unread_count > 0 {
        style(format!("{} new", entry.unread_count)).green().bold().to_string()
    } else {
        String::new()
    };

    println!(
        "  {:14} {:38} {}  {}",
        style(when).dim(),
        style(&entry.peer_id).bold(),
        truncate(preview, 40),
        unread
    );
}

/// Displays one thread row. `peer_id` identifies incoming messages.
pub fn display_thread_entry(entry: &ThreadEntry, peer_id: &str) {
    match entry {
        ThreadEntry::Confirmed(message) => {
            let who = if message.sender_id == peer_id {
                style("them").cyan()
            } else {
                style("you ").magenta()
            };
            println!(
                "  {} {} {}",
                style(short_time(message.created_at)).dim(),
                who,
                message.body
            );
        }
        ThreadEntry::Pending(pending) => {
            let marker = if pending.transmitted { "sending" } else { "queued" };
            println!(
                "  {} {} {} {}",
                style(short_time(pending.submitted_at)).dim(),
                style("you ").magenta(),
                pending.body,
                style(format!("({})", marker)).yellow()
            );
        }
    }
}

fn truncate(text: &str, max: usize) -> String {
    let line = text.lines().next().unwrap_or("");
    if line.chars().count() <= max {
        line.to_string()
    } else {
        let cut: String = line.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", cut)
    }
}
