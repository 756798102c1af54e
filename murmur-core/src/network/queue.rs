// SPDX-FileCopyrightText: 2026 Murmur Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Outbound send queue.
//!
//! Holds sends submitted while the channel was unusable. Entries leave the
//! queue strictly in enqueue order and only live as long as the process.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};

/// A locally originated message not yet handed to the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSend {
    /// Provisional id generated on this device. Never sent on the wire.
    pub local_id: String,
    pub peer_id: String,
    pub body: String,
    pub enqueued_at: DateTime<Utc>,
    /// Encoded wire frame, ready to transmit.
    pub(crate) frame: String,
}

impl PendingSend {
    /// The encoded frame this entry will transmit.
    pub fn frame(&self) -> &str {
        &self.frame
    }
}

/// FIFO of pending sends.
#[derive(Debug, Default)]
pub struct PendingQueue {
    entries: VecDeque<PendingSend>,
}

impl PendingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends to the back.
    pub fn push(&mut self, entry: PendingSend) {
        self.entries.push_back(entry);
    }

    /// Oldest entry.
    pub fn front(&self) -> Option<&PendingSend> {
        self.entries.front()
    }

    /// Removes the oldest entry.
    pub fn pop(&mut self) -> Option<PendingSend> {
        self.entries.pop_front()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in enqueue order.
    pub fn iter(&self) -> impl Iterator<Item = &PendingSend> {
        self.entries.iter()
    }
}
