// SPDX-FileCopyrightText: 2026 Murmur Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Error Types
//!
//! Unified error type for the Murmur client, with the failure taxonomy
//! callers use to decide between "sign in again", "show not found" and
//! "offer a retry".

use thiserror::Error;

use crate::credential::StorageError;
use crate::network::NetworkError;
use crate::rest::ApiError;

/// Coarse failure classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing or rejected credential. Not retried automatically.
    Auth,
    /// The requested resource does not exist.
    NotFound,
    /// Non-2xx response or connection-level failure. Retry is the caller's call.
    Transport,
    /// Malformed payload.
    Parse,
    /// Realtime channel dropped; recovered by the reconnect loop.
    ConnectionLost,
    /// Caller supplied something unusable (empty body, bad query, bad URL).
    Invalid,
}

impl ErrorKind {
    /// True when retrying the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorKind::Transport | ErrorKind::ConnectionLost)
    }
}

/// Unified error type for Murmur operations.
#[derive(Error, Debug)]
pub enum MurmurError {
    /// REST call failed.
    #[error("api error: {0}")]
    Api(#[from] ApiError),

    /// Realtime channel failed.
    #[error("network error: {0}")]
    Network(#[from] NetworkError),

    /// Credential storage failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl MurmurError {
    /// Classifies the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            MurmurError::Api(e) => e.kind(),
            MurmurError::Network(e) => match e {
                NetworkError::NotAuthenticated => ErrorKind::Auth,
                NetworkError::ConnectionClosed | NetworkError::NotConnected => {
                    ErrorKind::ConnectionLost
                }
                NetworkError::InvalidMessage(_) | NetworkError::InvalidUrl(_) => ErrorKind::Invalid,
                NetworkError::Serialization(_) => ErrorKind::Parse,
                NetworkError::ConnectionFailed(_)
                | NetworkError::SendFailed(_)
                | NetworkError::ReceiveFailed(_) => ErrorKind::Transport,
            },
            MurmurError::Storage(_) => ErrorKind::Transport,
            MurmurError::Configuration(_) => ErrorKind::Invalid,
        }
    }
}

/// Result type for Murmur operations.
pub type MurmurResult<T> = Result<T, MurmurError>;
