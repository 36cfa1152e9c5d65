// Copyright 2026 BadCompany
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! OS secret-service store.
//!
//! Each credential is one keyring entry under a fixed service name, with the
//! credential key as the user name. Platform support:
//!
//! - **macOS**: Keychain Services
//! - **Windows**: Credential Manager
//! - **Linux**: Secret Service or the kernel keyutils
//!
//! The OS API cannot enumerate entries, so [`CredentialStore::list`] only
//! returns keys written through this instance.

use std::collections::BTreeSet;

use keyring::Entry;
use parking_lot::Mutex;
use tracing::warn;

use crate::credentials::CredentialStore;
use crate::engine_core::constants::credentials;
use crate::engine_core::errors::WardenError;
use crate::engine_core::types::CredentialValue;

#[derive(Debug)]
pub struct KeyringCredentialStore {
    service: String,
    written: Mutex<BTreeSet<String>>,
}

impl Default for KeyringCredentialStore {
    fn default() -> Self {
        Self::new(credentials::DEFAULT_KEYRING_SERVICE)
    }
}

impl KeyringCredentialStore {
    pub fn new(service: &str) -> Self {
        Self {
            service: service.to_string(),
            written: Mutex::new(BTreeSet::new()),
        }
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    fn entry(&self, key: &str) -> Result<Entry, WardenError> {
        Entry::new(&self.service, key).map_err(|e| {
            WardenError::StorageError(format!("Failed to open keyring entry: {}", e))
        })
    }
}

impl CredentialStore for KeyringCredentialStore {
    fn get(&self, key: &str) -> Option<CredentialValue> {
        let entry = match self.entry(key) {
            Ok(entry) => entry,
            Err(e) => {
                warn!(key, error = %e, "Keyring unavailable");
                return None;
            }
        };
        match entry.get_password() {
            Ok(value) => Some(CredentialValue::new(value)),
            Err(keyring::Error::NoEntry) => None,
            Err(e) => {
                warn!(key, error = %e, "Keyring read failed");
                None
            }
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), WardenError> {
        self.entry(key)?
            .set_password(value)
            .map_err(|e| WardenError::StorageError(format!("Failed to store credential: {}", e)))?;
        self.written.lock().insert(key.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), WardenError> {
        match self.entry(key)?.delete_password() {
            Ok(()) | Err(keyring::Error::NoEntry) => {
                self.written.lock().remove(key);
                Ok(())
            }
            Err(e) => Err(WardenError::StorageError(format!(
                "Failed to delete credential: {}",
                e
            ))),
        }
    }

    fn list(&self) -> Vec<String> {
        self.written.lock().iter().cloned().collect()
    }

    fn backend_name(&self) -> &'static str {
        "keyring"
    }
}
