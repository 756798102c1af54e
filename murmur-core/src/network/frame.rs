// SPDX-FileCopyrightText: 2026 Murmur Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Realtime Frames
//!
//! JSON text frames exchanged over the realtime channel, plus the
//! local-only lifecycle events emitted to subscribers.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::NetworkError;
use crate::types::Message;

/// Outbound send frame type.
pub const MESSAGE_SEND: &str = "message.send";
/// Synthetic event emitted when the channel opens. Never sent on the wire.
pub const WS_OPEN: &str = "ws.open";
/// Synthetic event emitted when the channel closes. Never sent on the wire.
pub const WS_CLOSE: &str = "ws.close";

/// Inbound frame types that carry a confirmed message under `message`.
pub const INBOUND_MESSAGE_TYPES: &[&str] = &["message.new", "message"];

/// Frames the client sends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum OutboundFrame {
    #[serde(rename = "message.send")]
    MessageSend { peer_id: String, body: String },
}

impl OutboundFrame {
    /// Serializes the frame to its wire text.
    pub fn encode(&self) -> Result<String, NetworkError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Event delivered to realtime subscribers.
#[derive(Debug, Clone, PartialEq)]
pub enum RealtimeEvent {
    /// The channel reached the open state.
    Open,
    /// The channel closed (remote close, failure or owner request).
    Close,
    /// A parsed inbound JSON frame.
    Frame(Value),
}

impl RealtimeEvent {
    /// Parses an inbound text frame.
    ///
    /// Returns an error for anything that is not valid JSON; the caller
    /// drops such frames.
    pub fn parse(text: &str) -> Result<Self, NetworkError> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| NetworkError::InvalidMessage(format!("malformed frame: {}", e)))?;
        Ok(RealtimeEvent::Frame(value))
    }

    /// The event's `type`: `ws.open`, `ws.close`, or the frame's own field.
    pub fn event_type(&self) -> Option<&str> {
        match self {
            RealtimeEvent::Open => Some(WS_OPEN),
            RealtimeEvent::Close => Some(WS_CLOSE),
            RealtimeEvent::Frame(value) => value.get("type").and_then(Value::as_str),
        }
    }

    /// JSON form, as a JavaScript subscriber would have seen it.
    pub fn to_json(&self) -> Value {
        match self {
            RealtimeEvent::Open => serde_json::json!({ "type": WS_OPEN }),
            RealtimeEvent::Close => serde_json::json!({ "type": WS_CLOSE }),
            RealtimeEvent::Frame(value) => value.clone(),
        }
    }

    /// True for the synthetic open/close events.
    pub fn is_lifecycle(&self) -> bool {
        matches!(self, RealtimeEvent::Open | RealtimeEvent::Close)
    }

    /// Extracts the confirmed message carried by a message frame.
    pub fn message(&self) -> Option<Message> {
        let RealtimeEvent::Frame(value) = self else {
            return None;
        };
        let kind = value.get("type").and_then(Value::as_str)?;
        if !INBOUND_MESSAGE_TYPES.contains(&kind) {
            return None;
        }
        serde_json::from_value(value.get("message")?.clone()).ok()
    }
}
