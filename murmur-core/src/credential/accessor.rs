// SPDX-FileCopyrightText: 2026 Murmur Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Read-only access to the persisted credential.

use std::sync::Arc;

use tracing::debug;

use super::secure::SecureStorage;
use super::{AuthRecord, Credential, TokenSource, AUTH_STORAGE_KEY};

/// Reads the bearer token from the persisted auth record.
///
/// Never fails outward: a missing record, a storage error or an unparsable
/// record all mean "not authenticated".
#[derive(Clone)]
pub struct CredentialAccessor {
    storage: Arc<dyn SecureStorage>,
    key: String,
}

impl CredentialAccessor {
    /// Accessor for the default storage key.
    pub fn new(storage: Arc<dyn SecureStorage>) -> Self {
        Self::with_key(storage, AUTH_STORAGE_KEY)
    }

    pub fn with_key(storage: Arc<dyn SecureStorage>, key: impl Into<String>) -> Self {
        CredentialAccessor {
            storage,
            key: key.into(),
        }
    }

    /// Returns the stored token, or `None` if absent.
    pub fn get_token(&self) -> Option<Credential> {
        let raw = match self.storage.load_record(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                debug!(error = %e, "credential record unreadable");
                return None;
            }
        };

        let record: AuthRecord = match serde_json::from_slice(&raw) {
            Ok(record) => record,
            Err(e) => {
                debug!(error = %e, "credential record malformed");
                return None;
            }
        };

        record
            .token
            .filter(|token| !token.is_empty())
            .map(Credential::new)
    }
}

impl TokenSource for CredentialAccessor {
    fn get_token(&self) -> Option<Credential> {
        CredentialAccessor::get_token(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credential::secure::{MemoryRecordStorage, StorageError};

    struct BrokenStorage;

    impl SecureStorage for BrokenStorage {
        fn save_record(&self, _: &str, _: &[u8]) -> Result<(), StorageError> {
            Err(StorageError::Backend("unavailable".into()))
        }
        fn load_record(&self, _: &str) -> Result<Option<Vec<u8>>, StorageError> {
            Err(StorageError::Backend("unavailable".into()))
        }
        fn delete_record(&self, _: &str) -> Result<(), StorageError> {
            Err(StorageError::Backend("unavailable".into()))
        }
    }

    fn accessor_with(raw: Option<&[u8]>) -> CredentialAccessor {
        let storage = Arc::new(MemoryRecordStorage::new());
        if let Some(raw) = raw {
            storage.save_record(AUTH_STORAGE_KEY, raw).unwrap();
        }
        CredentialAccessor::new(storage)
    }

    #[test]
    fn test_returns_stored_token() {
        let accessor = accessor_with(Some(br#"{"isLoggedIn":true,"token":"abc"}"#));
        assert_eq!(accessor.get_token().unwrap().expose(), "abc");
    }

    #[test]
    fn test_missing_record_is_absent() {
        assert!(accessor_with(None).get_token().is_none());
    }

    #[test]
    fn test_logged_out_record_is_absent() {
        assert!(accessor_with(Some(br#"{"isLoggedIn":false}"#)).get_token().is_none());
    }

    #[test]
    fn test_empty_token_is_absent() {
        assert!(accessor_with(Some(br#"{"isLoggedIn":true,"token":""}"#)).get_token().is_none());
    }

    #[test]
    fn test_malformed_record_is_absent() {
        assert!(accessor_with(Some(b"not json")).get_token().is_none());
    }

    #[test]
    fn test_storage_error_is_absent() {
        let accessor = CredentialAccessor::new(Arc::new(BrokenStorage));
        assert!(accessor.get_token().is_none());
    }
}
