//! CLI Commands

pub mod auth;
pub mod inbox;
pub mod listen;
pub mod send;
pub mod thread;

use anyhow::{Context, Result};
use murmur_core::{RestClient, UserSummary};

/// Resolves a handle (with or without '@') to the user it names.
pub async fn resolve_user(rest: &RestClient, handle: &str) -> Result<UserSummary> {
    let handle = handle.trim().trim_start_matches('@');
    rest.get_user_by_handle(handle)
        .await
        .with_context(|| format!("Could not find user '@{}'", handle))
}
