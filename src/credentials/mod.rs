//! Credential storage.
//!
//! One [`CredentialStore`] capability with interchangeable backends, chosen
//! at construction from [`CredentialBackend`], and the [`registry`] that
//! layers the closed credential catalog over whichever store is active.

pub mod file_store;
#[cfg(feature = "keyring")]
pub mod keyring_store;
pub mod memory_store;
pub mod registry;

use std::sync::Arc;

use crate::config::{CredentialBackend, WardenConfig};
use crate::engine_core::errors::WardenError;
use crate::engine_core::types::CredentialValue;

pub use file_store::FileCredentialStore;
#[cfg(feature = "keyring")]
pub use keyring_store::KeyringCredentialStore;
pub use memory_store::MemoryCredentialStore;
pub use registry::CredentialRegistry;

/// Secret storage backend.
///
/// Reads never fail: an unreadable backend reports the key as absent.
pub trait CredentialStore: Send + Sync {
    fn get(&self, key: &str) -> Option<CredentialValue>;

    fn set(&self, key: &str, value: &str) -> Result<(), WardenError>;

    /// Removing an absent key is not an error.
    fn delete(&self, key: &str) -> Result<(), WardenError>;

    /// Keys this store knows about, sorted.
    fn list(&self) -> Vec<String>;

    fn backend_name(&self) -> &'static str;
}

/// Build the store selected by `config`.
pub fn open_store(config: &WardenConfig) -> Result<Arc<dyn CredentialStore>, WardenError> {
    match config.credential_backend {
        CredentialBackend::File => Ok(Arc::new(FileCredentialStore::open(
            &config.credentials_file,
        ))),
        CredentialBackend::Memory => Ok(Arc::new(MemoryCredentialStore::new())),
        #[cfg(feature = "keyring")]
        CredentialBackend::Keyring => Ok(Arc::new(KeyringCredentialStore::new(
            &config.keyring_service,
        ))),
        #[cfg(not(feature = "keyring"))]
        CredentialBackend::Keyring => Err(WardenError::ConfigurationError(
            "keyring backend requested but the `keyring` feature is disabled".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_memory_store() {
        let config = WardenConfig {
            credential_backend: CredentialBackend::Memory,
            ..WardenConfig::default()
        };
        let store = open_store(&config).unwrap();
        assert_eq!(store.backend_name(), "memory");
        assert!(store.list().is_empty());
    }

    #[test]
    fn test_open_file_store_with_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = WardenConfig {
            credential_backend: CredentialBackend::File,
            credentials_file: dir.path().join("absent.env"),
            ..WardenConfig::default()
        };
        let store = open_store(&config).unwrap();
        assert_eq!(store.backend_name(), "file");
        assert!(store.get("ANY").is_none());
    }
}
