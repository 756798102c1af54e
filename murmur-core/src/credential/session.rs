// SPDX-FileCopyrightText: 2026 Murmur Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Sign-in / sign-out writer for the auth record.

use std::sync::Arc;

use tracing::{debug, info};

use super::accessor::CredentialAccessor;
use super::secure::{SecureStorage, StorageError};
use super::{AuthRecord, Credential, AUTH_STORAGE_KEY};

/// The only component allowed to write the auth record.
#[derive(Clone)]
pub struct SessionWriter {
    storage: Arc<dyn SecureStorage>,
    key: String,
}

impl SessionWriter {
    pub fn new(storage: Arc<dyn SecureStorage>) -> Self {
        Self::with_key(storage, AUTH_STORAGE_KEY)
    }

    pub fn with_key(storage: Arc<dyn SecureStorage>, key: impl Into<String>) -> Self {
        SessionWriter {
            storage,
            key: key.into(),
        }
    }

    /// Persists a successful sign-in.
    pub fn store_login(&self, credential: &Credential) -> Result<(), StorageError> {
        self.write(&AuthRecord::logged_in(credential))?;
        info!("session stored");
        Ok(())
    }

    /// Persists a sign-out. The token is dropped from the record.
    pub fn store_logout(&self) -> Result<(), StorageError> {
        self.write(&AuthRecord::logged_out())?;
        info!("session cleared");
        Ok(())
    }

    /// Current record; logged-out when missing or unreadable.
    pub fn auth_state(&self) -> AuthRecord {
        match self.storage.load_record(&self.key) {
            Ok(Some(raw)) => serde_json::from_slice(&raw).unwrap_or_else(|e| {
                debug!(error = %e, "auth record malformed");
                AuthRecord::logged_out()
            }),
            Ok(None) => AuthRecord::logged_out(),
            Err(e) => {
                debug!(error = %e, "auth record unreadable");
                AuthRecord::logged_out()
            }
        }
    }

    /// Read-only accessor over the same record.
    pub fn accessor(&self) -> CredentialAccessor {
        CredentialAccessor::with_key(Arc::clone(&self.storage), self.key.clone())
    }

    fn write(&self, record: &AuthRecord) -> Result<(), StorageError> {
        let raw =
            serde_json::to_vec(record).map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.storage.save_record(&self.key, &raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credential::secure::MemoryRecordStorage;

    #[test]
    fn test_login_then_logout() {
        let writer = SessionWriter::new(Arc::new(MemoryRecordStorage::new()));
        let accessor = writer.accessor();
        assert!(!writer.auth_state().is_logged_in);

        writer.store_login(&Credential::new("tok")).unwrap();
        assert!(writer.auth_state().is_logged_in);
        assert_eq!(accessor.get_token().unwrap().expose(), "tok");

        writer.store_logout().unwrap();
        assert!(!writer.auth_state().is_logged_in);
        assert!(accessor.get_token().is_none());
    }

    #[test]
    fn test_custom_key_is_isolated() {
        let storage: Arc<dyn SecureStorage> = Arc::new(MemoryRecordStorage::new());
        let a = SessionWriter::with_key(Arc::clone(&storage), "a");
        let b = SessionWriter::with_key(storage, "b");

        a.store_login(&Credential::new("tok-a")).unwrap();

        assert!(b.accessor().get_token().is_none());
        assert_eq!(a.accessor().get_token().unwrap().expose(), "tok-a");
    }
}
