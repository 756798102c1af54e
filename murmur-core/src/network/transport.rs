// SPDX-FileCopyrightText: 2026 Murmur Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Transport Trait
//!
//! Platform-agnostic abstraction for the realtime text channel.

use std::time::Duration;

use url::Url;

use super::error::NetworkError;

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, NetworkError>;

/// Connection state of the realtime client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Not connected. A reconnect may be scheduled.
    Disconnected,
    /// Connection attempt in progress.
    Connecting,
    /// Connected and ready.
    Open,
    /// Shutting down at the owner's request.
    Closing,
}

impl ConnectionState {
    /// Lowercase name used in logs and CLI output.
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Open => "open",
            ConnectionState::Closing => "closing",
        }
    }
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration for transport connections.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Connection timeout.
    pub connect_timeout: Duration,
    /// Read timeout. Doubles as the poll interval of a blocking transport.
    pub read_timeout: Duration,
    /// Write timeout.
    pub write_timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        TransportConfig {
            connect_timeout: Duration::from_secs(10),
            read_timeout: Duration::from_millis(250),
            write_timeout: Duration::from_secs(10),
        }
    }
}

/// Everything a transport needs to open one connection.
#[derive(Clone)]
pub struct ConnectRequest {
    /// Realtime endpoint, token already in the query string.
    pub url: Url,
    /// WebSocket sub-protocols to offer (the bearer token, when enabled).
    pub protocols: Vec<String>,
    /// Socket timeouts.
    pub config: TransportConfig,
}

impl std::fmt::Debug for ConnectRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // The URL and protocols carry the bearer token.
        f.debug_struct("ConnectRequest")
            .field("host", &self.url.host_str())
            .field("path", &self.url.path())
            .field("protocols", &self.protocols.len())
            .field("config", &self.config)
            .finish()
    }
}

/// Transport trait for the realtime channel.
///
/// This trait abstracts the underlying transport mechanism (WebSocket, mock)
/// so the connection state machine can be tested without a network.
///
/// # Synchronous Interface
///
/// Methods are synchronous. `receive` must not block longer than the
/// configured read timeout so the owning event loop stays responsive.
pub trait Transport: Send {
    /// Opens the connection. Returns `Ok(())` once the channel is usable.
    fn connect(&mut self, request: &ConnectRequest) -> TransportResult<()>;

    /// Closes the connection.
    ///
    /// Safe to call even if not connected.
    fn disconnect(&mut self) -> TransportResult<()>;

    /// Returns true while the channel is usable.
    fn is_open(&self) -> bool;

    /// Sends one text frame.
    fn send_text(&mut self, frame: &str) -> TransportResult<()>;

    /// Receives the next text frame.
    ///
    /// Returns `Ok(None)` if nothing is available yet and
    /// `Err(NetworkError::ConnectionClosed)` once the peer has closed.
    fn receive(&mut self) -> TransportResult<Option<String>>;
}
