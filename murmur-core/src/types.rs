// SPDX-FileCopyrightText: 2026 Murmur Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Messaging Domain Types
//!
//! Shapes shared by the REST client, the realtime client and the thread
//! views. Field names match the server's JSON.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Server-assigned identifier (a UUID string).
pub type Id = String;

/// Public profile of a user, as returned by `GET /users/{handle}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: Id,
    /// The user's handle.
    pub username: String,
    #[serde(default)]
    pub display_name: Option<String>,
    /// Avatar URL.
    #[serde(default)]
    pub profile_photo: Option<String>,
}

impl UserSummary {
    /// Display name, falling back to the handle.
    pub fn label(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(&self.username)
    }
}

/// One conversation in the inbox, with last-activity summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboxEntry {
    pub chat_id: Id,
    pub peer_id: Id,
    #[serde(default)]
    pub last_message_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_message_id: Option<Id>,
    /// Preview of the last message body.
    #[serde(default)]
    pub last_body: Option<String>,
    #[serde(default)]
    pub unread_count: u32,
}

/// A confirmed message. Immutable once the server has assigned its id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: Id,
    pub chat_id: Id,
    pub sender_id: Id,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Thread order: creation time, then id for a deterministic tie-break.
    pub fn thread_order(&self, other: &Message) -> Ordering {
        self.created_at
            .cmp(&other.created_at)
            .then_with(|| self.id.cmp(&other.id))
    }
}

/// Selects a conversation for `GET /messages`.
///
/// The server expects exactly one of `chat_id` and `peer_id`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageQuery {
    pub chat_id: Option<Id>,
    pub peer_id: Option<Id>,
    /// Page size.
    pub limit: Option<u32>,
    /// Backward pagination cursor: only messages created before this instant.
    pub before: Option<DateTime<Utc>>,
}

impl MessageQuery {
    /// Query for the conversation with a peer.
    pub fn with_peer(peer_id: impl Into<Id>) -> Self {
        MessageQuery {
            peer_id: Some(peer_id.into()),
            ..Default::default()
        }
    }

    /// Query for a chat by id.
    pub fn with_chat(chat_id: impl Into<Id>) -> Self {
        MessageQuery {
            chat_id: Some(chat_id.into()),
            ..Default::default()
        }
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn before(mut self, before: DateTime<Utc>) -> Self {
        self.before = Some(before);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_deserializes_iso_timestamp() {
        let json = r#"{
            "id": "m1",
            "chat_id": "c1",
            "sender_id": "u1",
            "body": "hello",
            "created_at": "2026-03-01T10:30:00Z"
        }"#;
        let msg: Message = serde_json::from_str(json).unwrap();
        assert_eq!(msg.created_at.to_rfc3339(), "2026-03-01T10:30:00+00:00");
    }

    #[test]
    fn test_inbox_entry_tolerates_missing_optionals() {
        let json = r#"{"chat_id": "c1", "peer_id": "u2", "last_message_at": null}"#;
        let entry: InboxEntry = serde_json::from_str(json).unwrap();
        assert!(entry.last_message_at.is_none());
        assert!(entry.last_body.is_none());
        assert_eq!(entry.unread_count, 0);
    }

    #[test]
    fn test_user_label_falls_back_to_handle() {
        let mut user = UserSummary {
            id: "u1".into(),
            username: "ada".into(),
            display_name: None,
            profile_photo: None,
        };
        assert_eq!(user.label(), "ada");

        user.display_name = Some("Ada Lovelace".into());
        assert_eq!(user.label(), "Ada Lovelace");
    }
}
