//! CLI Configuration

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use murmur_core::credential::{CredentialAccessor, SecureStorage, SessionWriter};
use murmur_core::{ClientConfig, RestClient};

#[cfg(feature = "secure-storage")]
use murmur_core::credential::PlatformKeyring;

#[cfg(not(feature = "secure-storage"))]
use murmur_core::credential::FileRecordStorage;

/// Keychain service name.
#[cfg(feature = "secure-storage")]
const KEYRING_SERVICE: &str = "murmur-cli";

/// CLI configuration.
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// Data directory for the session record.
    pub data_dir: PathBuf,
    /// Client settings shared by the REST and realtime clients.
    pub client: ClientConfig,
}

impl CliConfig {
    pub fn new(data_dir: PathBuf, api_url: &str) -> Result<Self> {
        let client = ClientConfig::new(api_url).context("Invalid --api-url")?;
        Ok(CliConfig { data_dir, client })
    }

    /// Backend holding the auth record.
    ///
    /// When the `secure-storage` feature is enabled, uses the OS keychain.
    /// Otherwise, falls back to a file in the data directory.
    pub fn storage(&self) -> Arc<dyn SecureStorage> {
        #[cfg(feature = "secure-storage")]
        {
            Arc::new(PlatformKeyring::new(KEYRING_SERVICE))
        }

        #[cfg(not(feature = "secure-storage"))]
        {
            Arc::new(FileRecordStorage::new(&self.data_dir))
        }
    }

    pub fn session(&self) -> SessionWriter {
        SessionWriter::with_key(self.storage(), self.client.auth_storage_key.clone())
    }

    pub fn accessor(&self) -> CredentialAccessor {
        self.session().accessor()
    }

    pub fn rest(&self) -> Result<RestClient> {
        RestClient::with_session(&self.client, self.session()).context("Failed to build HTTP client")
    }
}
