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

//! Credential catalog over a store.
//!
//! The catalog is closed: every known credential is declared up front with
//! its scope, whether it is required and the format its value must match.
//! Reporting methods expose presence and validity only, never values.

use std::collections::{BTreeMap, HashSet};
use std::env;
use std::sync::Arc;

use regex::Regex;

use crate::credentials::CredentialStore;
use crate::engine_core::errors::WardenError;
use crate::engine_core::models::{
    CredentialDefinition, CredentialInfo, CredentialScope, FormatRule, KeyStatus,
};
use crate::engine_core::types::CredentialValue;
use crate::utils::security::mask_key;

impl CredentialDefinition {
    pub fn with_pattern(
        key: &str,
        description: &str,
        scope: CredentialScope,
        required: bool,
        pattern: &str,
    ) -> Result<Self, WardenError> {
        let regex = Regex::new(pattern).map_err(|e| {
            WardenError::ConfigurationError(format!("invalid format for {}: {}", key, e))
        })?;
        Ok(Self {
            key: key.to_string(),
            description: description.to_string(),
            scope,
            required,
            format: FormatRule::Pattern(regex),
        })
    }

    pub fn non_empty(key: &str, description: &str, scope: CredentialScope, required: bool) -> Self {
        Self {
            key: key.to_string(),
            description: description.to_string(),
            scope,
            required,
            format: FormatRule::NonEmpty,
        }
    }
}

/// The platform's built-in catalog, in declaration order.
pub fn default_catalog() -> Result<Vec<CredentialDefinition>, WardenError> {
    Ok(vec![
        CredentialDefinition::with_pattern(
            "OPENROUTER_API_KEY",
            "OpenRouter API key for the LLM",
            CredentialScope::Llm,
            true,
            r"^sk-or-[a-zA-Z0-9]{24,}$",
        )?,
        CredentialDefinition::with_pattern(
            "EXA_API_KEY",
            "Exa API key for the search agent",
            CredentialScope::SearchProvider,
            true,
            r"^exa-[a-zA-Z0-9]{32,}$",
        )?,
        CredentialDefinition::with_pattern(
            "AIRTABLE_API_KEY",
            "Airtable API key for the data agent",
            CredentialScope::DataProvider,
            true,
            r"^(pat|key)[a-zA-Z0-9]{14,}$",
        )?,
        CredentialDefinition::with_pattern(
            "CONTEXT7_TOKEN",
            "Context7 token for the documentation agent",
            CredentialScope::DocProvider,
            false,
            r"^[a-zA-Z0-9_-]{10,}$",
        )?,
        CredentialDefinition::non_empty(
            "DESKTOP_COMMANDER_TOKEN",
            "DesktopCommander token (if needed)",
            CredentialScope::DesktopProvider,
            false,
        ),
    ])
}

pub struct CredentialRegistry {
    catalog: Vec<CredentialDefinition>,
    store: Arc<dyn CredentialStore>,
    env_fallback: bool,
}

impl CredentialRegistry {
    /// Fails if two definitions share a key.
    pub fn new(
        store: Arc<dyn CredentialStore>,
        catalog: Vec<CredentialDefinition>,
    ) -> Result<Self, WardenError> {
        let mut seen = HashSet::new();
        for def in &catalog {
            if !seen.insert(def.key.as_str()) {
                return Err(WardenError::ConfigurationError(format!(
                    "duplicate credential key in catalog: {}",
                    def.key
                )));
            }
        }
        Ok(Self {
            catalog,
            store,
            env_fallback: true,
        })
    }

    pub fn with_default_catalog(store: Arc<dyn CredentialStore>) -> Result<Self, WardenError> {
        Self::new(store, default_catalog()?)
    }

    /// Whether lookups fall back to the process environment. On by default.
    pub fn with_env_fallback(mut self, enabled: bool) -> Self {
        self.env_fallback = enabled;
        self
    }

    pub fn catalog(&self) -> &[CredentialDefinition] {
        &self.catalog
    }

    pub fn definition(&self, key: &str) -> Option<&CredentialDefinition> {
        self.catalog.iter().find(|d| d.key == key)
    }

    pub fn backend_name(&self) -> &'static str {
        self.store.backend_name()
    }

    /// Store value, else the environment variable of the same name when
    /// fallback is on. Empty values count as absent.
    pub fn get(&self, key: &str) -> Option<CredentialValue> {
        self.store
            .get(key)
            .filter(|v| !v.is_empty())
            .or_else(|| {
                if self.env_fallback {
                    env::var(key)
                        .ok()
                        .filter(|v| !v.is_empty())
                        .map(CredentialValue::new)
                } else {
                    None
                }
            })
    }

    fn definitions_in(&self, scope: Option<CredentialScope>) -> impl Iterator<Item = &CredentialDefinition> {
        self.catalog
            .iter()
            .filter(move |d| scope.map_or(true, |s| d.scope == s))
    }

    /// Check required credentials, optionally limited to one scope.
    ///
    /// Returns whether all are present and well-formed, and the absent
    /// required keys in catalog order.
    pub fn validate(&self, scope: Option<CredentialScope>) -> (bool, Vec<String>) {
        let mut missing = Vec::new();
        let mut malformed = false;
        for def in self.definitions_in(scope).filter(|d| d.required) {
            match self.get(&def.key) {
                None => missing.push(def.key.clone()),
                Some(value) => {
                    if !def.format.matches(value.expose()) {
                        malformed = true;
                    }
                }
            }
        }
        (missing.is_empty() && !malformed, missing)
    }

    pub fn key_status(&self) -> BTreeMap<String, KeyStatus> {
        self.catalog
            .iter()
            .map(|def| {
                let value = self.get(&def.key);
                let status = KeyStatus {
                    present: value.is_some(),
                    valid: value
                        .as_ref()
                        .is_some_and(|v| def.format.matches(v.expose())),
                    required: def.required,
                    description: def.description.clone(),
                    scope: def.scope,
                };
                (def.key.clone(), status)
            })
            .collect()
    }

    /// Present credentials of one scope.
    pub fn credentials_for_scope(&self, scope: CredentialScope) -> BTreeMap<String, CredentialValue> {
        self.definitions_in(Some(scope))
            .filter_map(|def| self.get(&def.key).map(|v| (def.key.clone(), v)))
            .collect()
    }

    pub fn credential_info(&self) -> BTreeMap<String, CredentialInfo> {
        self.catalog
            .iter()
            .map(|def| {
                let info = CredentialInfo {
                    description: def.description.clone(),
                    scope: def.scope,
                    required: def.required,
                    is_set: self.get(&def.key).is_some(),
                };
                (def.key.clone(), info)
            })
            .collect()
    }

    /// Absent required keys grouped by scope. Scopes with nothing missing are omitted.
    pub fn missing_by_scope(&self) -> BTreeMap<CredentialScope, Vec<String>> {
        let mut out: BTreeMap<CredentialScope, Vec<String>> = BTreeMap::new();
        for def in self.catalog.iter().filter(|d| d.required) {
            if self.get(&def.key).is_none() {
                out.entry(def.scope).or_default().push(def.key.clone());
            }
        }
        out
    }

    pub fn has_missing_required(&self) -> bool {
        self.catalog
            .iter()
            .any(|d| d.required && self.get(&d.key).is_none())
    }

    pub fn set(&self, key: &str, value: &str) -> Result<(), WardenError> {
        self.store.set(key, value)
    }

    pub fn delete(&self, key: &str) -> Result<(), WardenError> {
        self.store.delete(key)
    }

    /// Masked form of a credential for display.
    pub fn masked(&self, key: &str) -> Option<String> {
        self.get(key).map(|v| mask_key(v.expose()))
    }
}
