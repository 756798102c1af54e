//! Auth Commands
//!
//! Sign in, sign out and session status.

use anyhow::{Context, Result};
use dialoguer::Password;

use crate::config::CliConfig;
use crate::display;

/// Signs in with a password grant and stores the session.
pub async fn login(config: &CliConfig, username: &str, password: Option<String>) -> Result<()> {
    let password = match password {
        Some(password) => password,
        None => Password::new()
            .with_prompt(format!("Password for @{}", username))
            .interact()
            .context("Failed to read password")?,
    };

    let rest = config.rest()?;
    rest.log_in(username, &password)
        .await
        .context("Sign-in failed")?;

    display::success(&format!("Signed in as @{}", username));
    Ok(())
}

/// Forgets the stored token.
pub fn logout(config: &CliConfig) -> Result<()> {
    config.rest()?.log_out().context("Failed to clear session")?;
    display::success("Signed out");
    Ok(())
}

/// Shows whether a token is stored.
pub fn status(config: &CliConfig) {
    let record = config.session().auth_state();
    if record.is_logged_in && config.accessor().get_token().is_some() {
        display::success("Signed in");
    } else {
        display::info("Not signed in. Run 'murmur login <username>'.");
    }
    println!("  API: {}", config.client.api_url);
}
