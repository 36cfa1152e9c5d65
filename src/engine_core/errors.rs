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

// Domain error types - secure error handling with no information disclosure

use thiserror::Error;

/// Main error type for the warden.
#[derive(Error, Debug)]
pub enum WardenError {
    /// Credential file missing or malformed, bad catalog, bad config values.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// Input or tool call rejected. Carries a reason, never the payload.
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Token invalid, expired or tampered. Deliberately carries no cause.
    #[error("Authentication failed")]
    AuthenticationError,

    /// Credential backend unavailable.
    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Cryptographic error: {0}")]
    CryptoError(#[from] CryptoError),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Cryptographic operation errors
#[derive(Error, Debug)]
pub enum CryptoError {
    /// Failed to key the MAC
    #[error("Failed to initialise HMAC: {0}")]
    HashingError(String),

    /// Supplied server secret is unusable
    #[error("Server secret must not be empty")]
    EmptySecret,
}

impl WardenError {
    /// Get user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            WardenError::ConfigurationError(_) => "Internal error".to_string(),
            WardenError::ValidationError(reason) => format!("Validation failed: {}", reason),
            WardenError::AuthenticationError => "Authentication failed".to_string(),
            WardenError::StorageError(_) => "Credential unavailable".to_string(),
            WardenError::CryptoError(_) => "Internal error".to_string(),
            WardenError::IoError(_) => "Internal system error".to_string(),
        }
    }
}
