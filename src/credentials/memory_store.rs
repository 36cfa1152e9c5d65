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

use std::collections::BTreeMap;

use parking_lot::RwLock;

use crate::credentials::CredentialStore;
use crate::engine_core::errors::WardenError;
use crate::engine_core::types::CredentialValue;

/// Volatile store. Nothing survives the process.
#[derive(Default)]
pub struct MemoryCredentialStore {
    entries: RwLock<BTreeMap<String, CredentialValue>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: RwLock::new(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.into(), CredentialValue::new(v.into())))
                    .collect(),
            ),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self, key: &str) -> Option<CredentialValue> {
        self.entries.read().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), WardenError> {
        self.entries
            .write()
            .insert(key.to_string(), CredentialValue::from(value));
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), WardenError> {
        self.entries.write().remove(key);
        Ok(())
    }

    fn list(&self) -> Vec<String> {
        self.entries.read().keys().cloned().collect()
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
