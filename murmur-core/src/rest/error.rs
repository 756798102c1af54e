// SPDX-FileCopyrightText: 2026 Murmur Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! REST error types.

use thiserror::Error;

use crate::credential::StorageError;
use crate::error::ErrorKind;

/// Longest response body kept in an error.
pub const BODY_SNIPPET_CHARS: usize = 512;

/// Errors returned by [`RestClient`](super::RestClient).
#[derive(Error, Debug)]
pub enum ApiError {
    /// No credential stored; the request was not sent.
    #[error("not authenticated")]
    NotAuthenticated,

    /// Server rejected the credential (401/403).
    #[error("unauthorized ({status}): {body}")]
    Unauthorized { status: u16, body: String },

    /// 404.
    #[error("not found ({status}): {body}")]
    NotFound { status: u16, body: String },

    /// Any other non-2xx response.
    #[error("HTTP error {status}: {body}")]
    Http { status: u16, body: String },

    /// Request never produced a response (DNS, connect, timeout).
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Response body did not match the expected shape.
    #[error("decode error: {0}")]
    Decode(String),

    /// The query cannot be sent as-is.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// Message body rejected before sending.
    #[error("invalid message body: {0}")]
    InvalidBody(String),

    /// Persisting the session failed.
    #[error("session storage error: {0}")]
    Session(#[from] StorageError),
}

impl ApiError {
    /// Builds the error for a non-2xx response.
    pub fn from_status(status: u16, body: &str) -> Self {
        let body = snippet(body);
        match status {
            401 | 403 => ApiError::Unauthorized { status, body },
            404 => ApiError::NotFound { status, body },
            _ => ApiError::Http { status, body },
        }
    }

    /// HTTP status, when a response was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized { status, .. }
            | ApiError::NotFound { status, .. }
            | ApiError::Http { status, .. } => Some(*status),
            ApiError::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Response body snippet, when a response was received.
    pub fn body(&self) -> Option<&str> {
        match self {
            ApiError::Unauthorized { body, .. }
            | ApiError::NotFound { body, .. }
            | ApiError::Http { body, .. } => Some(body),
            _ => None,
        }
    }

    /// Classifies the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::NotAuthenticated | ApiError::Unauthorized { .. } => ErrorKind::Auth,
            ApiError::NotFound { .. } => ErrorKind::NotFound,
            ApiError::Http { .. } | ApiError::Network(_) | ApiError::Session(_) => {
                ErrorKind::Transport
            }
            ApiError::Decode(_) => ErrorKind::Parse,
            ApiError::InvalidQuery(_) | ApiError::InvalidBody(_) => ErrorKind::Invalid,
        }
    }

    /// True for [`ErrorKind::Auth`].
    pub fn is_auth_error(&self) -> bool {
        self.kind() == ErrorKind::Auth
    }
}

fn snippet(body: &str) -> String {
    let body = body.trim();
    match body.char_indices().nth(BODY_SNIPPET_CHARS) {
        Some((cut, _)) => format!("{}…", &body[..cut]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        assert_eq!(ApiError::from_status(401, "").kind(), ErrorKind::Auth);
        assert_eq!(ApiError::from_status(403, "").kind(), ErrorKind::Auth);
        assert_eq!(ApiError::from_status(404, "").kind(), ErrorKind::NotFound);
        assert_eq!(ApiError::from_status(500, "").kind(), ErrorKind::Transport);
        assert_eq!(ApiError::from_status(422, "").kind(), ErrorKind::Transport);
    }

    #[test]
    fn test_status_and_body_are_kept() {
        let err = ApiError::from_status(503, "  overloaded \n");
        assert_eq!(err.status(), Some(503));
        assert_eq!(err.body(), Some("overloaded"));
        assert_eq!(err.to_string(), "HTTP error 503: overloaded");
    }

    #[test]
    fn test_long_body_is_truncated() {
        let long = "x".repeat(BODY_SNIPPET_CHARS + 100);
        let err = ApiError::from_status(500, &long);
        let body = err.body().unwrap();
        assert_eq!(body.chars().count(), BODY_SNIPPET_CHARS + 1);
        assert!(body.ends_with('…'));
    }

    #[test]
    fn test_not_authenticated_has_no_status() {
        assert_eq!(ApiError::NotAuthenticated.status(), None);
        assert!(ApiError::NotAuthenticated.is_auth_error());
    }
}
