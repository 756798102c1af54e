//! Listen Command
//!
//! Streams realtime events. A blocking worker drives the realtime client
//! and forwards every event over a channel; the async side renders them.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use murmur_core::credential::TokenSource;
use murmur_core::network::{NetworkError, RealtimeClient, RealtimeConfig, RealtimeEvent, WebSocketTransport};
use murmur_core::{Conversation, InboxView, LiveOutcome, ThreadEntry, UserSummary};
use tokio::sync::mpsc;
use tracing::debug;

use super::resolve_user;
use crate::config::CliConfig;
use crate::display;

/// Sleep between polls while the channel is down.
const IDLE_WAIT: Duration = Duration::from_millis(100);

enum Scope {
    Thread(Box<Conversation>, UserSummary),
    Inbox(InboxView),
}

/// Streams events until Ctrl-C.
pub async fn run(config: &CliConfig, handle: Option<&str>) -> Result<()> {
    let rest = config.rest()?;

    let mut scope = match handle {
        Some(handle) => {
            let peer = resolve_user(&rest, handle).await?;
            let mut conversation = Conversation::new(peer.id.clone(), &config.client);
            conversation
                .load(&rest)
                .await
                .context("Failed to load messages")?;
            for entry in conversation.view().entries() {
                display::display_thread_entry(entry, &peer.id);
            }
            Scope::Thread(Box::new(conversation), peer)
        }
        None => {
            let mut inbox = InboxView::new();
            inbox.replace(rest.get_inbox(None).await.context("Failed to load inbox")?);
            Scope::Inbox(inbox)
        }
    };

    let (tx, mut rx) = mpsc::unbounded_channel::<RealtimeEvent>();
    let stop = Arc::new(AtomicBool::new(false));
    let worker_stop = stop.clone();
    let realtime_config = RealtimeConfig::from(&config.client);
    let tokens: Arc<dyn TokenSource> = Arc::new(config.accessor());

    let worker = tokio::task::spawn_blocking(move || -> Result<(), NetworkError> {
        let mut client = RealtimeClient::new(WebSocketTransport::new(), realtime_config, tokens);
        let _forward = client.on(move |event| {
            tx.send(event.clone())?;
            Ok(())
        });

        client.connect()?;
        while !worker_stop.load(Ordering::SeqCst) {
            client.poll();
            if !client.is_open() {
                std::thread::sleep(IDLE_WAIT);
            }
        }
        client.close();
        Ok(())
    });

    display::info("Listening. Press Ctrl-C to stop.");

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    loop {
        tokio::select! {
            _ = &mut ctrl_c => break,
            event = rx.recv() => match event {
                Some(event) => render(&mut scope, &event),
                None => break,
            },
        }
    }

    stop.store(true, Ordering::SeqCst);
    worker
        .await
        .context("Realtime worker failed")?
        .context("Realtime channel failed")?;
    Ok(())
}

fn render(scope: &mut Scope, event: &RealtimeEvent) {
    match event {
        RealtimeEvent::Open => display::success("Connected"),
        RealtimeEvent::Close => display::warning("Connection lost, reconnecting"),
        RealtimeEvent::Frame(_) => {
            let Some(message) = event.message() else {
                debug!(event_type = ?event.event_type(), "ignoring event");
                return;
            };
            match scope {
                Scope::Thread(conversation, peer) => {
                    if let Some(LiveOutcome::Inserted | LiveOutcome::Confirmed { .. }) =
                        conversation.apply_event(event)
                    {
                        display::display_thread_entry(&ThreadEntry::Confirmed(message), &peer.id);
                    }
                }
                Scope::Inbox(inbox) => {
                    if !inbox.apply_message(&message) {
                        display::info(&format!("New conversation {}", message.chat_id));
                    }
                    println!("  {} {}", message.sender_id, message.body);
                }
            }
        }
    }
}
