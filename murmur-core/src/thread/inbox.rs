// SPDX-FileCopyrightText: 2026 Murmur Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Inbox view: conversations ordered by last activity.

use std::cmp::Ordering;

use crate::types::{InboxEntry, Message};

/// Local copy of the inbox.
///
/// Order: most recent activity first, chats without activity last, ties
/// broken by `chat_id` ascending so equal timestamps never reorder between
/// refreshes.
#[derive(Debug, Clone, Default)]
pub struct InboxView {
    entries: Vec<InboxEntry>,
}

impl InboxView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the local copy with a fresh fetch.
    pub fn replace(&mut self, mut entries: Vec<InboxEntry>) {
        entries.sort_by(inbox_order);
        self.entries = entries;
    }

    pub fn entries(&self) -> &[InboxEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of unread counts.
    pub fn total_unread(&self) -> u64 {
        self.entries.iter().map(|e| u64::from(e.unread_count)).sum()
    }

    pub fn find_by_peer(&self, peer_id: &str) -> Option<&InboxEntry> {
        self.entries.iter().find(|e| e.peer_id == peer_id)
    }

    pub fn find_by_chat(&self, chat_id: &str) -> Option<&InboxEntry> {
        self.entries.iter().find(|e| e.chat_id == chat_id)
    }

    /// Updates the preview of a known chat from a live message.
    ///
    /// Messages from the peer bump the unread count. Returns false for
    /// unknown chats, which need a refetch.
    pub fn apply_message(&mut self, message: &Message) -> bool {
        let Some(entry) = self.entries.iter_mut().find(|e| e.chat_id == message.chat_id) else {
            return false;
        };
        if entry.last_message_id.as_deref() == Some(message.id.as_str()) {
            return true;
        }
        if entry.last_message_at.is_some_and(|at| at > message.created_at) {
            return true;
        }

        entry.last_message_at = Some(message.created_at);
        entry.last_message_id = Some(message.id.clone());
        entry.last_body = Some(message.body.clone());
        if message.sender_id == entry.peer_id {
            entry.unread_count = entry.unread_count.saturating_add(1);
        }
        self.entries.sort_by(inbox_order);
        true
    }

    /// Clears the unread count of a chat.
    pub fn mark_read(&mut self, chat_id: &str) {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.chat_id == chat_id) {
            entry.unread_count = 0;
        }
    }
}

fn inbox_order(a: &InboxEntry, b: &InboxEntry) -> Ordering {
    match (a.last_message_at, b.last_message_at) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
    .then_with(|| a.chat_id.cmp(&b.chat_id))
}
