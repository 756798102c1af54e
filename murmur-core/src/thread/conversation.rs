// SPDX-FileCopyrightText: 2026 Murmur Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Conversation view-model.
//!
//! Glue between one [`ThreadView`] and the two clients. Neither client is
//! owned here: the caller passes them in per call, so one realtime channel
//! can serve many conversations.

use chrono::Utc;
use tracing::{debug, warn};
use uuid::Uuid;

use super::view::{LiveOutcome, PendingEntry, ThreadView};
use crate::config::ClientConfig;
use crate::network::{NetworkError, RealtimeClient, RealtimeEvent, SendReceipt, Transport};
use crate::rest::{ApiError, RestClient};
use crate::types::{Message, MessageQuery};

/// An open conversation with one peer.
#[derive(Debug, Clone)]
pub struct Conversation {
    view: ThreadView,
    page_limit: u32,
}

impl Conversation {
    pub fn new(peer_id: impl Into<String>, config: &ClientConfig) -> Self {
        Conversation {
            view: ThreadView::new(peer_id, config.confirm_window),
            page_limit: config.page_limit,
        }
    }

    pub fn peer_id(&self) -> &str {
        self.view.peer_id()
    }

    /// The merged thread.
    pub fn view(&self) -> &ThreadView {
        &self.view
    }

    /// Loads the newest page of history. Returns the number of messages.
    pub async fn load(&mut self, rest: &RestClient) -> Result<usize, ApiError> {
        let query = MessageQuery::with_peer(self.view.peer_id()).limit(self.page_limit);
        let messages = rest.get_messages(&query).await?;
        let count = messages.len();
        self.view.load_initial(messages);
        debug!(count, "thread loaded");
        Ok(count)
    }

    /// Loads the page before the oldest loaded message. Returns how many
    /// new messages were merged; zero means the start of the thread.
    pub async fn load_older(&mut self, rest: &RestClient) -> Result<usize, ApiError> {
        let Some(cursor) = self.view.oldest_cursor() else {
            return self.load(rest).await;
        };
        let query = MessageQuery::with_peer(self.view.peer_id())
            .limit(self.page_limit)
            .before(cursor);
        let messages = rest.get_messages(&query).await?;
        Ok(self.view.merge_older(messages))
    }

    /// Sends over the realtime channel and shows the message as pending.
    ///
    /// The body is trimmed first. When the channel is down the send is
    /// queued, never failed.
    pub fn send<T: Transport>(
        &mut self,
        realtime: &mut RealtimeClient<T>,
        body: &str,
    ) -> Result<SendReceipt, NetworkError> {
        let receipt = realtime.send(self.view.peer_id(), body.trim())?;
        self.view.submit_pending(PendingEntry::from(&receipt));
        Ok(receipt)
    }

    /// Sends over HTTP. The pending entry is confirmed with the returned
    /// message, or removed if the request fails.
    pub async fn send_via_rest(&mut self, rest: &RestClient, body: &str) -> Result<Message, ApiError> {
        let body = body.trim();
        let local_id = Uuid::new_v4().to_string();
        self.view.submit_pending(PendingEntry {
            local_id: local_id.clone(),
            peer_id: self.view.peer_id().to_string(),
            body: body.to_string(),
            submitted_at: Utc::now(),
            transmitted: true,
        });

        match rest.send_message(self.view.peer_id(), body).await {
            Ok(message) => {
                self.view.confirm_local(&local_id, message.clone());
                Ok(message)
            }
            Err(e) => {
                warn!(error = %e, "send failed");
                self.view.discard_pending(&local_id);
                Err(e)
            }
        }
    }

    /// Applies a realtime event. Returns `None` for events that carry no
    /// message.
    pub fn apply_event(&mut self, event: &RealtimeEvent) -> Option<LiveOutcome> {
        let message = event.message()?;
        Some(self.view.apply_live(message))
    }

    /// Marks the pending entries the realtime client no longer holds as
    /// transmitted. Call after the channel reopens.
    pub fn sync_transmitted<T: Transport>(&mut self, realtime: &RealtimeClient<T>) {
        let queued: Vec<String> = realtime.pending().map(|p| p.local_id.clone()).collect();
        let flushed: Vec<String> = self
            .view
            .pending()
            .filter(|p| !p.transmitted && !queued.contains(&p.local_id))
            .map(|p| p.local_id.clone())
            .collect();
        for local_id in flushed {
            self.view.mark_transmitted(&local_id);
        }
    }
}
