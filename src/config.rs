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

use crate::engine_core::constants::{config as env_keys, credentials, limits, session};
use crate::engine_core::errors::WardenError;
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialBackend {
    #[default]
    File,
    Keyring,
    Memory,
}

impl CredentialBackend {
    /// Unknown names fall back to the file backend.
    pub fn parse_safe(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "keyring" | "vault" | "os" => CredentialBackend::Keyring,
            "memory" | "mem" => CredentialBackend::Memory,
            _ => CredentialBackend::File,
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WardenConfig {
    pub credential_backend: CredentialBackend,
    pub credentials_file: PathBuf,
    pub keyring_service: String,
    /// Server secret for token signatures. A random one is generated when unset.
    #[serde(skip_serializing)]
    pub auth_secret: Option<String>,
    pub session_ttl_secs: u64,
    pub max_message_length: usize,
    pub max_response_length: usize,
    /// Directory for `security_YYYYMMDD.log`. No file sink when unset.
    pub audit_log_dir: Option<PathBuf>,
    pub env_fallback: bool,
    pub log_level: String,
    pub log_format: String, // "json" or "text"
}

impl fmt::Debug for WardenConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WardenConfig")
            .field("credential_backend", &self.credential_backend)
            .field("credentials_file", &self.credentials_file)
            .field("keyring_service", &self.keyring_service)
            .field("auth_secret", &self.auth_secret.as_ref().map(|_| "<REDACTED>"))
            .field("session_ttl_secs", &self.session_ttl_secs)
            .field("max_message_length", &self.max_message_length)
            .field("max_response_length", &self.max_response_length)
            .field("audit_log_dir", &self.audit_log_dir)
            .field("env_fallback", &self.env_fallback)
            .field("log_level", &self.log_level)
            .field("log_format", &self.log_format)
            .finish()
    }
}

impl Default for WardenConfig {
    fn default() -> Self {
        Self {
            credential_backend: CredentialBackend::File,
            credentials_file: PathBuf::from(credentials::DEFAULT_CREDENTIALS_FILE),
            keyring_service: credentials::DEFAULT_KEYRING_SERVICE.to_string(),
            auth_secret: None,
            session_ttl_secs: session::DEFAULT_TTL_SECS,
            max_message_length: limits::MAX_MESSAGE_LENGTH,
            max_response_length: limits::MAX_RESPONSE_LENGTH,
            audit_log_dir: None,
            env_fallback: true,
            log_level: "info".to_string(),
            log_format: "text".to_string(),
        }
    }
}

impl WardenConfig {
    /// Defaults overlaid with environment variables.
    pub fn from_env() -> Result<Self, WardenError> {
        let mut config = Self::default();
        config.apply_env()?;
        Ok(config)
    }

    /// YAML document overlaid with environment variables.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, WardenError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            WardenError::ConfigurationError(format!("cannot read {}: {}", path.display(), e))
        })?;
        let mut config = Self::from_yaml_str(&contents)?;
        config.apply_env()?;
        Ok(config)
    }

    pub fn from_yaml_str(contents: &str) -> Result<Self, WardenError> {
        serde_yaml_ng::from_str(contents)
            .map_err(|e| WardenError::ConfigurationError(format!("invalid config: {}", e)))
    }

    fn apply_env(&mut self) -> Result<(), WardenError> {
        if let Ok(v) = env::var(env_keys::ENV_CREDENTIAL_BACKEND) {
            self.credential_backend = CredentialBackend::parse_safe(&v);
        }
        if let Ok(v) = env::var(env_keys::ENV_CREDENTIALS_FILE) {
            self.credentials_file = PathBuf::from(v);
        }
        if let Ok(v) = env::var(env_keys::ENV_KEYRING_SERVICE) {
            self.keyring_service = v;
        }
        if let Ok(v) = env::var(env_keys::ENV_AUTH_SECRET) {
            if !v.is_empty() {
                self.auth_secret = Some(v);
            }
        }
        if let Ok(v) = env::var(env_keys::ENV_SESSION_TTL_SECS) {
            self.session_ttl_secs = parse_number(env_keys::ENV_SESSION_TTL_SECS, &v)?;
        }
        if let Ok(v) = env::var(env_keys::ENV_MAX_MESSAGE_LENGTH) {
            self.max_message_length = parse_number(env_keys::ENV_MAX_MESSAGE_LENGTH, &v)?;
        }
        if let Ok(v) = env::var(env_keys::ENV_AUDIT_LOG_DIR) {
            self.audit_log_dir = Some(PathBuf::from(v));
        }
        if let Ok(v) = env::var(env_keys::ENV_ENV_FALLBACK) {
            self.env_fallback = v.to_lowercase() == "true" || v == "1";
        }
        if let Ok(v) = env::var(env_keys::ENV_LOG_LEVEL) {
            self.log_level = v;
        }
        if let Ok(v) = env::var(env_keys::ENV_LOG_FORMAT) {
            self.log_format = v;
        }
        Ok(())
    }

    /// Session lifetime, clamped to a representable range.
    pub fn session_ttl(&self) -> chrono::Duration {
        let secs = i64::try_from(self.session_ttl_secs)
            .unwrap_or(i64::MAX)
            .min(session::MAX_TTL_SECS);
        chrono::Duration::seconds(secs)
    }

    pub fn validate(&self) -> Result<(), WardenError> {
        if self.session_ttl_secs == 0 {
            return Err(WardenError::ConfigurationError(
                "session_ttl_secs must be positive".to_string(),
            ));
        }
        if self.max_message_length == 0 || self.max_response_length == 0 {
            return Err(WardenError::ConfigurationError(
                "message length limits must be positive".to_string(),
            ));
        }
        if self.auth_secret.as_deref() == Some("") {
            return Err(WardenError::ConfigurationError(
                "auth_secret must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_number<T: std::str::FromStr>(name: &str, raw: &str) -> Result<T, WardenError> {
    raw.trim()
        .parse()
        .map_err(|_| WardenError::ConfigurationError(format!("{} must be a number", name)))
}
