// SPDX-FileCopyrightText: 2026 Murmur Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Mock Transport
//!
//! Scriptable in-memory transport for tests and for embedders that want
//! to drive the realtime client without a network.

use std::collections::VecDeque;

use super::error::NetworkError;
use super::transport::{ConnectRequest, Transport, TransportResult};

#[derive(Debug, Clone)]
enum Inbound {
    Text(String),
    RemoteClose,
}

/// In-memory transport with error injection.
#[derive(Debug, Default)]
pub struct MockTransport {
    open: bool,
    connect_errors: VecDeque<NetworkError>,
    send_errors: VecDeque<NetworkError>,
    fail_disconnect: bool,
    inbound: VecDeque<Inbound>,
    sent: Vec<String>,
    connect_requests: Vec<ConnectRequest>,
    disconnect_calls: usize,
}

impl MockTransport {
    /// Creates a new mock transport.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next `connect` call fail with `error`. Stackable.
    pub fn inject_connect_error(&mut self, error: NetworkError) {
        self.connect_errors.push_back(error);
    }

    /// Makes the next `count` connects fail.
    pub fn fail_next_connects(&mut self, count: usize) {
        for _ in 0..count {
            self.inject_connect_error(NetworkError::ConnectionFailed("connection refused".into()));
        }
    }

    /// Makes the next `send_text` call fail with `error`. Stackable.
    pub fn inject_send_error(&mut self, error: NetworkError) {
        self.send_errors.push_back(error);
    }

    /// Makes every `disconnect` call return an error.
    pub fn set_fail_disconnect(&mut self, fail: bool) {
        self.fail_disconnect = fail;
    }

    /// Queues an inbound text frame.
    pub fn queue_receive(&mut self, frame: impl Into<String>) {
        self.inbound.push_back(Inbound::Text(frame.into()));
    }

    /// Queues a close initiated by the server.
    pub fn queue_remote_close(&mut self) {
        self.inbound.push_back(Inbound::RemoteClose);
    }

    /// Forces the open flag (simulates a silently dropped socket).
    pub fn set_open(&mut self, open: bool) {
        self.open = open;
    }

    /// Frames transmitted so far, in order.
    pub fn sent_frames(&self) -> &[String] {
        &self.sent
    }

    /// Clears the transmitted frames.
    pub fn clear_sent(&mut self) {
        self.sent.clear();
    }

    /// Every connect request received, including failed ones.
    pub fn connect_requests(&self) -> &[ConnectRequest] {
        &self.connect_requests
    }

    /// Number of `disconnect` calls.
    pub fn disconnect_calls(&self) -> usize {
        self.disconnect_calls
    }

    /// Returns true if inbound frames are waiting.
    pub fn has_pending(&self) -> bool {
        !self.inbound.is_empty()
    }
}

impl Transport for MockTransport {
    fn connect(&mut self, request: &ConnectRequest) -> TransportResult<()> {
        self.connect_requests.push(request.clone());
        if let Some(error) = self.connect_errors.pop_front() {
            self.open = false;
            return Err(error);
        }
        self.open = true;
        Ok(())
    }

    fn disconnect(&mut self) -> TransportResult<()> {
        self.disconnect_calls += 1;
        self.open = false;
        if self.fail_disconnect {
            return Err(NetworkError::ConnectionFailed("close failed".into()));
        }
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn send_text(&mut self, frame: &str) -> TransportResult<()> {
        if !self.open {
            return Err(NetworkError::NotConnected);
        }
        if let Some(error) = self.send_errors.pop_front() {
            return Err(error);
        }
        self.sent.push(frame.to_string());
        Ok(())
    }

    fn receive(&mut self) -> TransportResult<Option<String>> {
        if !self.open {
            return Err(NetworkError::NotConnected);
        }
        match self.inbound.pop_front() {
            Some(Inbound::Text(text)) => Ok(Some(text)),
            Some(Inbound::RemoteClose) => {
                self.open = false;
                Err(NetworkError::ConnectionClosed)
            }
            None => Ok(None),
        }
    }
}
