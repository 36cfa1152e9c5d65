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

//! lilith-warden Constants - Single source of truth for all configuration values.
//!
//! This module centralizes limits, markers, names and environment variables
//! to ensure consistency and maintainability.

/// Cryptographic constants
pub mod crypto {
    /// HMAC-SHA256 secret key length in bytes
    pub const SECRET_KEY_LENGTH: usize = 32;
    /// Separator between token segments
    pub const TOKEN_SEGMENT_SEPARATOR: char = '.';
    /// Separator between user id and timestamp inside the payload segment
    pub const TOKEN_PAYLOAD_SEPARATOR: char = ':';
    /// Number of dot-delimited segments in an access token
    pub const TOKEN_SEGMENTS: usize = 3;
}

/// Session management
pub mod session {
    /// Default session lifetime (24 hours)
    pub const DEFAULT_TTL_SECS: u64 = 24 * 60 * 60;
    /// Upper bound on a configured lifetime (100 years)
    pub const MAX_TTL_SECS: i64 = 100 * 365 * 24 * 60 * 60;
    /// Number of lock shards in the session table
    pub const TABLE_SHARDS: usize = 16;
}

/// Validation limits (DoS protection)
pub mod limits {
    /// Maximum user message length in characters
    pub const MAX_MESSAGE_LENGTH: usize = 32_000;
    /// Maximum agent response `message` length in characters
    pub const MAX_RESPONSE_LENGTH: usize = 100_000;
}

/// Replacement markers
pub mod markers {
    /// Value replacement for sensitive fields and secret assignments
    pub const REDACTED: &str = "[REDACTED]";
    /// Replacement for malicious content stripped from input
    pub const REMOVED: &str = "[REMOVED]";
    /// Shown in place of a redacted Debug/Display value
    pub const OPAQUE: &str = "<REDACTED>";
}

/// Response envelope
pub mod response {
    /// Field every agent response must carry
    pub const MESSAGE_FIELD: &str = "message";
    /// Field name always stripped from outbound data
    pub const INTERNAL_FIELD: &str = "internal";
    /// Prefix marking a field as internal
    pub const INTERNAL_PREFIX: &str = "_";
    /// Generic error returned when an agent response is malformed
    pub const GENERIC_FORMAT_ERROR: &str = "Internal response format error";
}

/// Credential storage
pub mod credentials {
    /// Default credentials file
    pub const DEFAULT_CREDENTIALS_FILE: &str = ".env";
    /// Default OS keyring service name
    pub const DEFAULT_KEYRING_SERVICE: &str = "lilith-warden";
    /// Comment prefix in the credentials file
    pub const COMMENT_PREFIX: &str = "#";
}

/// Audit trail
pub mod audit {
    /// tracing target for audit records
    pub const TRACING_TARGET: &str = "audit";
    /// Audit file name prefix; the date (YYYYMMDD) and `.log` are appended
    pub const FILE_PREFIX: &str = "security_";
    /// Code used for event types outside the closed set
    pub const GENERIC_CODE: &str = "GENERAL";
}

/// Configuration Environment Variables
pub mod config {
    pub const ENV_CONFIG_PATH: &str = "LILITH_WARDEN_CONFIG";
    pub const ENV_CREDENTIAL_BACKEND: &str = "LILITH_WARDEN_CREDENTIAL_BACKEND";
    pub const ENV_CREDENTIALS_FILE: &str = "LILITH_WARDEN_CREDENTIALS_FILE";
    pub const ENV_KEYRING_SERVICE: &str = "LILITH_WARDEN_KEYRING_SERVICE";
    pub const ENV_AUTH_SECRET: &str = "AUTH_SECRET_KEY";
    pub const ENV_SESSION_TTL_SECS: &str = "LILITH_WARDEN_SESSION_TTL_SECS";
    pub const ENV_MAX_MESSAGE_LENGTH: &str = "LILITH_WARDEN_MAX_MESSAGE_LENGTH";
    pub const ENV_AUDIT_LOG_DIR: &str = "LILITH_WARDEN_AUDIT_LOG_DIR";
    pub const ENV_ENV_FALLBACK: &str = "LILITH_WARDEN_ENV_FALLBACK";
    pub const ENV_LOG_LEVEL: &str = "LOG_LEVEL";
    pub const ENV_LOG_FORMAT: &str = "LOG_FORMAT";
}
