//! Send Command
//!
//! Sends over the realtime channel, falling back to HTTP when the channel
//! does not come up in time.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use murmur_core::credential::TokenSource;
use murmur_core::network::{NetworkError, RealtimeClient, RealtimeConfig, WebSocketTransport};

use super::resolve_user;
use crate::config::CliConfig;
use crate::display;

/// Sleep between polls while the channel is down.
const IDLE_WAIT: Duration = Duration::from_millis(100);

/// Sends over HTTP.
pub async fn via_rest(config: &CliConfig, handle: &str, body: &str) -> Result<()> {
    let rest = config.rest()?;
    let peer = resolve_user(&rest, handle).await?;

    let message = rest
        .send_message(&peer.id, body.trim())
        .await
        .context("Failed to send message")?;

    display::success(&format!("Sent to @{} ({})", peer.username, message.id));
    Ok(())
}

/// Sends over the realtime channel; waits up to `wait_secs` for the queue
/// to drain, then falls back to HTTP.
pub async fn via_realtime(config: &CliConfig, handle: &str, body: &str, wait_secs: u64) -> Result<()> {
    let rest = config.rest()?;
    let peer = resolve_user(&rest, handle).await?;

    let realtime_config = RealtimeConfig::from(&config.client);
    let tokens: Arc<dyn TokenSource> = Arc::new(config.accessor());
    let peer_id = peer.id.clone();
    let text = body.trim().to_string();
    let wait = Duration::from_secs(wait_secs);

    let delivered = tokio::task::spawn_blocking(move || {
        deliver(realtime_config, tokens, &peer_id, &text, wait)
    })
    .await
    .context("Realtime worker failed")?
    .context("Realtime send failed")?;

    if delivered {
        display::success(&format!("Sent to @{}", peer.username));
        return Ok(());
    }

    display::warning("Realtime channel unavailable, sending over HTTP");
    via_rest(config, handle, body).await
}

fn deliver(
    config: RealtimeConfig,
    tokens: Arc<dyn TokenSource>,
    peer_id: &str,
    body: &str,
    wait: Duration,
) -> Result<bool, NetworkError> {
    let mut client = RealtimeClient::new(WebSocketTransport::new(), config, tokens);
    client.connect()?;

    let receipt = client.send(peer_id, body)?;
    if receipt.is_sent() {
        client.close();
        return Ok(true);
    }

    let deadline = Instant::now() + wait;
    while Instant::now() < deadline {
        client.poll();
        if client.pending_count() == 0 {
            client.close();
            return Ok(true);
        }
        if !client.is_open() {
            std::thread::sleep(IDLE_WAIT);
        }
    }

    client.close();
    Ok(false)
}
