// SPDX-FileCopyrightText: 2026 Murmur Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Client configuration

use std::time::Duration;

use tracing::warn;
use url::Url;

use crate::credential::AUTH_STORAGE_KEY;
use crate::error::{MurmurError, MurmurResult};
use crate::network::TransportConfig;

/// Environment variable holding the REST base URL.
pub const API_URL_ENV: &str = "MURMUR_API_URL";

/// API used when nothing is configured (local development server).
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Configuration for the messaging client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Absolute REST base URL, e.g. `http://localhost:8000`.
    pub api_url: Url,

    /// Path of the realtime endpoint on the API host.
    pub realtime_path: String,

    /// Storage key of the auth record.
    pub auth_storage_key: String,

    /// Default inbox page size.
    pub inbox_limit: u32,

    /// Default thread page size.
    pub page_limit: u32,

    /// First reconnect delay.
    pub reconnect_base: Duration,

    /// Reconnect delay cap.
    pub reconnect_max: Duration,

    /// How far apart a queued send and its server copy may be and still be
    /// treated as the same message.
    pub confirm_window: Duration,

    /// Longest accepted message body, in characters.
    pub max_body_chars: usize,

    /// HTTP timeout for REST calls.
    pub request_timeout: Duration,

    /// Open the realtime channel even without a credential.
    pub allow_anonymous_realtime: bool,

    /// Offer the token as a WebSocket sub-protocol in addition to the query
    /// parameter.
    pub token_subprotocol: bool,

    /// Socket timeouts for the realtime transport.
    pub transport: TransportConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            realtime_path: "/ws".to_string(),
            auth_storage_key: AUTH_STORAGE_KEY.to_string(),
            inbox_limit: 30,
            page_limit: 50,
            reconnect_base: Duration::from_secs(1),
            reconnect_max: Duration::from_secs(8),
            confirm_window: Duration::from_secs(60),
            max_body_chars: 500,
            request_timeout: Duration::from_secs(30),
            allow_anonymous_realtime: false,
            token_subprotocol: true,
            transport: TransportConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Configuration with the given API URL.
    pub fn new(api_url: &str) -> MurmurResult<Self> {
        Ok(Self {
            api_url: parse_api_url(api_url)?,
            ..Default::default()
        })
    }

    /// Reads the API URL from `MURMUR_API_URL`, defaulting to the local
    /// development server.
    pub fn from_env() -> MurmurResult<Self> {
        match std::env::var(API_URL_ENV) {
            Ok(url) if !url.trim().is_empty() => Self::new(url.trim()),
            _ => Ok(Self::default()),
        }
    }

    /// Sets the reconnect backoff bounds.
    pub fn with_reconnect(mut self, base: Duration, max: Duration) -> Self {
        self.reconnect_base = base;
        self.reconnect_max = max;
        self
    }

    /// Allows realtime connections without a credential.
    pub fn with_anonymous_realtime(mut self, allow: bool) -> Self {
        self.allow_anonymous_realtime = allow;
        self
    }

    /// Enables or disables the token sub-protocol.
    pub fn with_token_subprotocol(mut self, enabled: bool) -> Self {
        self.token_subprotocol = enabled;
        self
    }

    /// Sets the optimistic-send reconciliation window.
    pub fn with_confirm_window(mut self, window: Duration) -> Self {
        self.confirm_window = window;
        self
    }

    /// Sets the HTTP timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

/// Parses an API base URL. Non-http(s) schemes are accepted with a warning.
pub fn parse_api_url(raw: &str) -> MurmurResult<Url> {
    let url = Url::parse(raw)
        .map_err(|e| MurmurError::Configuration(format!("invalid API URL '{}': {}", raw, e)))?;

    if !matches!(url.scheme(), "http" | "https") {
        warn!(api_url = %url, "API URL does not look like http(s)");
    }
    if url.host_str().is_none() {
        return Err(MurmurError::Configuration(format!(
            "API URL '{}' has no host",
            raw
        )));
    }

    Ok(url)
}

fn default_api_url() -> Url {
    Url::parse(DEFAULT_API_URL).unwrap_or_else(|_| unreachable!("default API URL is valid"))
}
