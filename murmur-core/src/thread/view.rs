// SPDX-FileCopyrightText: 2026 Murmur Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Thread View
//!
//! One conversation as the UI shows it: server history, live pushes and
//! optimistic local sends merged into a single ordered sequence.
//!
//! Invariants:
//! - a server message id appears at most once
//! - confirmed messages are in thread order, except that a confirmed send
//!   keeps the slot its optimistic entry had
//! - pending entries stay where they were submitted until confirmed

use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::network::{SendOutcome, SendReceipt};
use crate::types::{Id, Message};

/// A send shown before the server confirmed it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingEntry {
    /// Provisional id; discarded once confirmed.
    pub local_id: String,
    pub peer_id: Id,
    pub body: String,
    pub submitted_at: DateTime<Utc>,
    /// False while the send waits in the realtime queue.
    pub transmitted: bool,
}

impl From<&SendReceipt> for PendingEntry {
    fn from(receipt: &SendReceipt) -> Self {
        PendingEntry {
            local_id: receipt.local_id.clone(),
            peer_id: receipt.peer_id.clone(),
            body: receipt.body.clone(),
            submitted_at: receipt.submitted_at,
            transmitted: receipt.outcome == SendOutcome::Sent,
        }
    }
}

/// One row of the thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThreadEntry {
    Confirmed(Message),
    Pending(PendingEntry),
}

impl ThreadEntry {
    pub fn body(&self) -> &str {
        match self {
            ThreadEntry::Confirmed(m) => &m.body,
            ThreadEntry::Pending(p) => &p.body,
        }
    }

    /// Server creation time, or submission time for pending entries.
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            ThreadEntry::Confirmed(m) => m.created_at,
            ThreadEntry::Pending(p) => p.submitted_at,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, ThreadEntry::Pending(_))
    }

    /// The confirmed message, if any.
    pub fn message(&self) -> Option<&Message> {
        match self {
            ThreadEntry::Confirmed(m) => Some(m),
            ThreadEntry::Pending(_) => None,
        }
    }
}

/// What [`ThreadView::apply_live`] did with a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LiveOutcome {
    /// Already in the thread.
    Duplicate,
    /// Replaced the pending entry with this local id.
    Confirmed { local_id: String },
    /// Added as a new row.
    Inserted,
    /// Belongs to another conversation.
    Ignored,
}

/// Merged view of one conversation with `peer_id`.
#[derive(Debug, Clone)]
pub struct ThreadView {
    peer_id: Id,
    chat_id: Option<Id>,
    entries: Vec<ThreadEntry>,
    confirm_window: chrono::Duration,
}

impl ThreadView {
    /// Empty view of the conversation with `peer_id`.
    ///
    /// `confirm_window` bounds how far a server copy's timestamp may be
    /// from the local submission and still confirm it.
    pub fn new(peer_id: impl Into<Id>, confirm_window: Duration) -> Self {
        ThreadView {
            peer_id: peer_id.into(),
            chat_id: None,
            entries: Vec::new(),
            confirm_window: chrono::Duration::from_std(confirm_window)
                .unwrap_or(chrono::Duration::MAX),
        }
    }

    pub fn peer_id(&self) -> &str {
        &self.peer_id
    }

    /// Chat id, once learned from a loaded or pushed message.
    pub fn chat_id(&self) -> Option<&str> {
        self.chat_id.as_deref()
    }

    /// All rows, oldest first.
    pub fn entries(&self) -> &[ThreadEntry] {
        &self.entries
    }

    /// Confirmed messages in display order.
    pub fn messages(&self) -> impl Iterator<Item = &Message> {
        self.entries.iter().filter_map(ThreadEntry::message)
    }

    /// Unconfirmed sends in submission order.
    pub fn pending(&self) -> impl Iterator<Item = &PendingEntry> {
        self.entries.iter().filter_map(|e| match e {
            ThreadEntry::Pending(p) => Some(p),
            ThreadEntry::Confirmed(_) => None,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True if a confirmed message with this id is present.
    pub fn contains(&self, message_id: &str) -> bool {
        self.messages().any(|m| m.id == message_id)
    }

    /// `before` cursor for the next older page.
    pub fn oldest_cursor(&self) -> Option<DateTime<Utc>> {
        self.messages().map(|m| m.created_at).min()
    }

    /// Replaces the history with the first page. Pending entries stay
    /// after the loaded messages, except those whose server copy is already
    /// in the page (our message, same body, within the confirm window).
    /// Each loaded message confirms at most one pending entry, oldest first.
    pub fn load_initial(&mut self, messages: Vec<Message>) {
        let pending: Vec<PendingEntry> = self
            .entries
            .drain(..)
            .filter_map(|e| match e {
                ThreadEntry::Pending(p) => Some(p),
                ThreadEntry::Confirmed(_) => None,
            })
            .collect();

        let mut messages = messages;
        messages.sort_by(Message::thread_order);
        messages.dedup_by(|a, b| a.id == b.id);
        if self.chat_id.is_none() {
            self.chat_id = messages.first().map(|m| m.chat_id.clone());
        }

        let mut claimed = vec![false; messages.len()];
        let mut surviving = Vec::with_capacity(pending.len());
        for entry in pending {
            let found = messages.iter().enumerate().position(|(i, m)| {
                !claimed[i] && m.sender_id != self.peer_id && self.confirms(&entry, m)
            });
            match found {
                Some(i) => {
                    claimed[i] = true;
                    debug!(
                        local_id = %entry.local_id,
                        message_id = %messages[i].id,
                        "pending send found in history"
                    );
                }
                None => surviving.push(ThreadEntry::Pending(entry)),
            }
        }

        self.entries = messages.into_iter().map(ThreadEntry::Confirmed).collect();
        self.entries.extend(surviving);
    }

    /// Merges an older page. Returns how many messages were new.
    pub fn merge_older(&mut self, messages: Vec<Message>) -> usize {
        let mut added = 0;
        for message in messages {
            if self.contains(&message.id) {
                continue;
            }
            self.learn_chat(&message);
            self.insert_sorted(message);
            added += 1;
        }
        added
    }

    /// Applies a message pushed over the realtime channel.
    ///
    /// A message from us that matches a pending entry (same body, within
    /// the confirm window) replaces the oldest such entry in place.
    /// Anything else is inserted in thread order.
    ///
    /// Until the chat id is known (no message loaded or pushed yet), only
    /// messages from the peer or matching a pending entry are accepted.
    /// A message frame names no recipient, so our own message sent from
    /// another device cannot be told apart from one to a different peer
    /// and is `Ignored`; the next `load_initial` picks it up.
    pub fn apply_live(&mut self, message: Message) -> LiveOutcome {
        if self.contains(&message.id) {
            return LiveOutcome::Duplicate;
        }

        let from_peer = message.sender_id == self.peer_id;
        let belongs = match &self.chat_id {
            Some(chat_id) => *chat_id == message.chat_id,
            None => from_peer || self.matching_pending(&message).is_some(),
        };
        if !belongs {
            return LiveOutcome::Ignored;
        }
        self.learn_chat(&message);

        if !from_peer {
            if let Some(index) = self.matching_pending(&message) {
                let local_id = match &self.entries[index] {
                    ThreadEntry::Pending(p) => p.local_id.clone(),
                    ThreadEntry::Confirmed(_) => String::new(),
                };
                debug!(%local_id, message_id = %message.id, "pending send confirmed");
                self.entries[index] = ThreadEntry::Confirmed(message);
                return LiveOutcome::Confirmed { local_id };
            }
        }

        self.insert_sorted(message);
        LiveOutcome::Inserted
    }

    /// Adds an optimistic entry at the end of the thread.
    pub fn submit_pending(&mut self, entry: PendingEntry) {
        self.entries.push(ThreadEntry::Pending(entry));
    }

    /// Confirms a pending entry with the message the server returned for
    /// it. Returns false if no pending entry had this id.
    pub fn confirm_local(&mut self, local_id: &str, message: Message) -> bool {
        let Some(index) = self
            .entries
            .iter()
            .position(|e| matches!(e, ThreadEntry::Pending(p) if p.local_id == local_id))
        else {
            return false;
        };

        self.learn_chat(&message);
        if self.contains(&message.id) {
            // The live push won the race.
            self.entries.remove(index);
        } else {
            self.entries[index] = ThreadEntry::Confirmed(message);
        }
        true
    }

    /// Removes a pending entry whose send failed for good.
    pub fn discard_pending(&mut self, local_id: &str) -> Option<PendingEntry> {
        let index = self
            .entries
            .iter()
            .position(|e| matches!(e, ThreadEntry::Pending(p) if p.local_id == local_id))?;
        match self.entries.remove(index) {
            ThreadEntry::Pending(p) => Some(p),
            ThreadEntry::Confirmed(_) => None,
        }
    }

    /// Marks a queued pending entry as handed to the transport.
    pub fn mark_transmitted(&mut self, local_id: &str) -> bool {
        for entry in &mut self.entries {
            if let ThreadEntry::Pending(p) = entry {
                if p.local_id == local_id {
                    p.transmitted = true;
                    return true;
                }
            }
        }
        false
    }

    fn learn_chat(&mut self, message: &Message) {
        if self.chat_id.is_none() {
            self.chat_id = Some(message.chat_id.clone());
        }
    }

    fn matching_pending(&self, message: &Message) -> Option<usize> {
        self.entries.iter().position(|e| match e {
            ThreadEntry::Pending(p) => self.confirms(p, message),
            ThreadEntry::Confirmed(_) => false,
        })
    }

    fn confirms(&self, pending: &PendingEntry, message: &Message) -> bool {
        pending.body == message.body
            && (message.created_at - pending.submitted_at).abs() <= self.confirm_window
    }

    /// Inserts before the first confirmed message that sorts after it.
    fn insert_sorted(&mut self, message: Message) {
        let index = self
            .entries
            .iter()
            .position(|e| {
                e.message()
                    .is_some_and(|m| m.thread_order(&message) == std::cmp::Ordering::Greater)
            })
            .unwrap_or(self.entries.len());
        self.entries.insert(index, ThreadEntry::Confirmed(message));
    }
}
