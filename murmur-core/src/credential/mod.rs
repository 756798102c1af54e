// SPDX-FileCopyrightText: 2026 Murmur Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Credentials
//!
//! The bearer token lives in one persisted record under a fixed key:
//! `{ "isLoggedIn": bool, "token"?: string }`. The sign-in/sign-out flow
//! ([`SessionWriter`]) is the only writer; everything else reads through
//! [`CredentialAccessor`].

mod accessor;
pub mod secure;
mod session;

use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

pub use accessor::CredentialAccessor;
pub use secure::{FileRecordStorage, MemoryRecordStorage, SecureStorage, StorageError};
#[cfg(feature = "secure-storage")]
pub use secure::PlatformKeyring;
pub use session::SessionWriter;

/// Storage key of the auth record.
pub const AUTH_STORAGE_KEY: &str = "auth-key";

/// Opaque bearer token. Zeroized on drop; `Debug` never prints it.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Credential(token.into())
    }

    /// The raw token, for placing on the wire.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// `Authorization` header value.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

/// Anything that can produce the current credential.
///
/// Returns `None` when the user is not authenticated. Implementations never
/// fail outward.
pub trait TokenSource: Send + Sync {
    fn get_token(&self) -> Option<Credential>;
}

/// Fixed token, for tests and embedders that manage auth themselves.
#[derive(Debug, Clone, Default)]
pub struct StaticToken(Option<Credential>);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        StaticToken(Some(Credential::new(token)))
    }

    /// A source that is never authenticated.
    pub fn absent() -> Self {
        StaticToken(None)
    }
}

impl TokenSource for StaticToken {
    fn get_token(&self) -> Option<Credential> {
        self.0.clone()
    }
}

/// The persisted auth record.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthRecord {
    #[serde(default)]
    pub is_logged_in: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl AuthRecord {
    /// Record written on successful sign-in.
    pub fn logged_in(credential: &Credential) -> Self {
        AuthRecord {
            is_logged_in: true,
            token: Some(credential.expose().to_string()),
        }
    }

    /// Record written on sign-out.
    pub fn logged_out() -> Self {
        AuthRecord::default()
    }
}

impl std::fmt::Debug for AuthRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthRecord")
            .field("is_logged_in", &self.is_logged_in)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
