// SPDX-FileCopyrightText: 2026 Murmur Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Secure Storage Module
//!
//! Backends for the persisted auth record. Uses OS keychains (macOS
//! Keychain, Linux Secret Service, Windows Credential Manager) when the
//! `secure-storage` feature is enabled, with a file fallback.

use std::collections::HashMap;
use std::path::PathBuf;

use parking_lot::Mutex;
use thiserror::Error;

/// Errors from record storage backends.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("Storage backend error: {0}")]
    Backend(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Trait for secure storage of small records.
pub trait SecureStorage: Send + Sync {
    /// Saves a record, replacing any previous value.
    fn save_record(&self, name: &str, value: &[u8]) -> Result<(), StorageError>;

    /// Loads a record.
    /// Returns None if the record doesn't exist.
    fn load_record(&self, name: &str) -> Result<Option<Vec<u8>>, StorageError>;

    /// Deletes a record. Deleting a missing record succeeds.
    fn delete_record(&self, name: &str) -> Result<(), StorageError>;

    /// Checks if a record exists.
    fn has_record(&self, name: &str) -> Result<bool, StorageError> {
        Ok(self.load_record(name)?.is_some())
    }
}

/// Platform keyring implementation using the `keyring` crate.
/// Available when the `secure-storage` feature is enabled.
#[cfg(feature = "secure-storage")]
pub struct PlatformKeyring {
    service: String,
}

#[cfg(feature = "secure-storage")]
impl PlatformKeyring {
    /// Creates a new platform keyring accessor.
    ///
    /// # Arguments
    /// * `service` - The service name to use for keychain entries (e.g., "murmur")
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }
}

#[cfg(feature = "secure-storage")]
impl SecureStorage for PlatformKeyring {
    fn save_record(&self, name: &str, value: &[u8]) -> Result<(), StorageError> {
        let entry = keyring::Entry::new(&self.service, name)
            .map_err(|e| StorageError::Backend(format!("Keyring error: {}", e)))?;

        entry
            .set_secret(value)
            .map_err(|e| StorageError::Backend(format!("Failed to save to keychain: {}", e)))
    }

    fn load_record(&self, name: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let entry = keyring::Entry::new(&self.service, name)
            .map_err(|e| StorageError::Backend(format!("Keyring error: {}", e)))?;

        match entry.get_secret() {
            Ok(secret) => Ok(Some(secret)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(StorageError::Backend(format!(
                "Failed to load from keychain: {}",
                e
            ))),
        }
    }

    fn delete_record(&self, name: &str) -> Result<(), StorageError> {
        let entry = keyring::Entry::new(&self.service, name)
            .map_err(|e| StorageError::Backend(format!("Keyring error: {}", e)))?;

        match entry.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(StorageError::Backend(format!(
                "Failed to delete from keychain: {}",
                e
            ))),
        }
    }
}

/// File-based record storage (fallback when keyring is unavailable).
///
/// One file per record inside `dir`, readable by the owner only on Unix.
pub struct FileRecordStorage {
    dir: PathBuf,
}

impl FileRecordStorage {
    /// Creates a new file-based record storage rooted at `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn record_path(&self, name: &str) -> PathBuf {
        // Sanitize the name to prevent path traversal
        let safe_name = name
            .chars()
            .map(|c| {
                if c.is_alphanumeric() || c == '_' || c == '-' {
                    c
                } else {
                    '_'
                }
            })
            .collect::<String>();
        self.dir.join(format!("{}.json", safe_name))
    }
}

impl SecureStorage for FileRecordStorage {
    fn save_record(&self, name: &str, value: &[u8]) -> Result<(), StorageError> {
        std::fs::create_dir_all(&self.dir)
            .map_err(|e| StorageError::Backend(format!("Failed to create directory: {}", e)))?;

        let path = self.record_path(name);
        std::fs::write(&path, value)
            .map_err(|e| StorageError::Backend(format!("Failed to write record: {}", e)))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o600))
                .map_err(|e| StorageError::Backend(format!("Failed to restrict record: {}", e)))?;
        }

        Ok(())
    }

    fn load_record(&self, name: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let path = self.record_path(name);
        if !path.exists() {
            return Ok(None);
        }

        std::fs::read(&path)
            .map(Some)
            .map_err(|e| StorageError::Backend(format!("Failed to read record: {}", e)))
    }

    fn delete_record(&self, name: &str) -> Result<(), StorageError> {
        let path = self.record_path(name);
        if path.exists() {
            std::fs::remove_file(&path)
                .map_err(|e| StorageError::Backend(format!("Failed to delete record: {}", e)))?;
        }
        Ok(())
    }
}

/// In-memory storage, for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryRecordStorage {
    records: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryRecordStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SecureStorage for MemoryRecordStorage {
    fn save_record(&self, name: &str, value: &[u8]) -> Result<(), StorageError> {
        self.records.lock().insert(name.to_string(), value.to_vec());
        Ok(())
    }

    fn load_record(&self, name: &str) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self.records.lock().get(name).cloned())
    }

    fn delete_record(&self, name: &str) -> Result<(), StorageError> {
        self.records.lock().remove(name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_memory_storage_roundtrip() {
        let storage = MemoryRecordStorage::new();
        assert!(!storage.has_record("auth-key").unwrap());

        storage.save_record("auth-key", b"{}").unwrap();
        assert_eq!(storage.load_record("auth-key").unwrap(), Some(b"{}".to_vec()));

        storage.delete_record("auth-key").unwrap();
        assert!(storage.load_record("auth-key").unwrap().is_none());
    }

    #[test]
    fn test_file_storage_persists_across_instances() {
        let dir = tempdir().unwrap();

        FileRecordStorage::new(dir.path())
            .save_record("auth-key", b"value")
            .unwrap();

        let reopened = FileRecordStorage::new(dir.path());
        assert_eq!(reopened.load_record("auth-key").unwrap(), Some(b"value".to_vec()));
    }

    #[test]
    fn test_file_storage_sanitizes_names() {
        let dir = tempdir().unwrap();
        let storage = FileRecordStorage::new(dir.path());

        storage.save_record("../escape", b"x").unwrap();

        assert!(dir.path().join("___escape.json").exists());
    }

    #[test]
    fn test_file_storage_delete_missing_is_ok() {
        let dir = tempdir().unwrap();
        let storage = FileRecordStorage::new(dir.path());
        assert!(storage.delete_record("nothing").is_ok());
    }
}
