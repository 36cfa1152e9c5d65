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

//! Domain models for lilith-warden.
//!
//! This module contains pure data structures representing credentials,
//! sessions, validation outcomes and audit events. It is designed to be free
//! of I/O side effects.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::engine_core::constants::audit;

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

/// Logical owner of a credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialScope {
    Llm,
    SearchProvider,
    DataProvider,
    DocProvider,
    DesktopProvider,
}

impl CredentialScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Llm => "llm",
            Self::SearchProvider => "search_provider",
            Self::DataProvider => "data_provider",
            Self::DocProvider => "doc_provider",
            Self::DesktopProvider => "desktop_provider",
        }
    }
}

impl fmt::Display for CredentialScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CredentialScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "llm" => Ok(Self::Llm),
            "search_provider" | "search" => Ok(Self::SearchProvider),
            "data_provider" | "data" => Ok(Self::DataProvider),
            "doc_provider" | "doc" | "docs" => Ok(Self::DocProvider),
            "desktop_provider" | "desktop" => Ok(Self::DesktopProvider),
            other => Err(format!("unknown credential scope '{}'", other)),
        }
    }
}

/// How a credential value must look to count as valid.
#[derive(Debug, Clone)]
pub enum FormatRule {
    /// The whole value must match the (anchored) expression.
    Pattern(Regex),
    /// Any non-empty value is accepted.
    NonEmpty,
}

impl FormatRule {
    pub fn matches(&self, value: &str) -> bool {
        match self {
            Self::Pattern(re) => re.is_match(value),
            Self::NonEmpty => !value.is_empty(),
        }
    }
}

/// One entry of the credential catalog.
#[derive(Debug, Clone)]
pub struct CredentialDefinition {
    pub key: String,
    pub description: String,
    pub scope: CredentialScope,
    pub required: bool,
    pub format: FormatRule,
}

/// Presence/validity of one catalog key. Never carries the value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyStatus {
    pub present: bool,
    pub valid: bool,
    pub required: bool,
    pub description: String,
    pub scope: CredentialScope,
}

/// Public metadata of one catalog key. Never carries the value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CredentialInfo {
    pub description: String,
    pub scope: CredentialScope,
    pub required: bool,
    pub is_set: bool,
}

// ---------------------------------------------------------------------------
// Sessions
// ---------------------------------------------------------------------------

/// Server-held record binding an access token to a user and an expiry.
#[derive(Clone, Serialize)]
pub struct Session {
    pub session_id: Uuid,
    pub user_id: String,
    #[serde(skip_serializing)]
    pub access_token: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub active: bool,
}

impl Session {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("session_id", &self.session_id)
            .field("user_id", &self.user_id)
            .field("access_token", &"<REDACTED>")
            .field("created_at", &self.created_at)
            .field("expires_at", &self.expires_at)
            .field("active", &self.active)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Result of a trust-boundary check. Never carries the rejected payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationOutcome {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl ValidationOutcome {
    pub fn accept() -> Self {
        Self {
            ok: true,
            reason: None,
        }
    }

    pub fn reject(reason: impl Into<String>) -> Self {
        Self {
            ok: false,
            reason: Some(reason.into()),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.ok
    }

    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }

    /// Convert into a `Result` for `?`-style callers.
    pub fn into_result(self) -> Result<(), crate::engine_core::errors::WardenError> {
        if self.ok {
            Ok(())
        } else {
            Err(crate::engine_core::errors::WardenError::ValidationError(
                self.reason.unwrap_or_default(),
            ))
        }
    }
}

// ---------------------------------------------------------------------------
// Audit
// ---------------------------------------------------------------------------

/// Kind of security-relevant action. Closed set; anything else is `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventType {
    Authentication,
    Authorization,
    DataAccess,
    ApiRequest,
    ToolUsage,
    SecurityViolation,
    ConfigurationChange,
    Other(String),
}

impl EventType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Authentication => "authentication",
            Self::Authorization => "authorization",
            Self::DataAccess => "data_access",
            Self::ApiRequest => "api_request",
            Self::ToolUsage => "tool_usage",
            Self::SecurityViolation => "security_violation",
            Self::ConfigurationChange => "configuration_change",
            Self::Other(name) => name,
        }
    }

    /// Fixed short code written into every audit record.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Authentication => "AUTH",
            Self::Authorization => "AUTHZ",
            Self::DataAccess => "DATA",
            Self::ApiRequest => "API",
            Self::ToolUsage => "TOOL",
            Self::SecurityViolation => "SECVIO",
            Self::ConfigurationChange => "CONFIG",
            Self::Other(_) => audit::GENERIC_CODE,
        }
    }
}

impl From<&str> for EventType {
    fn from(s: &str) -> Self {
        match s {
            "authentication" => Self::Authentication,
            "authorization" => Self::Authorization,
            "data_access" => Self::DataAccess,
            "api_request" => Self::ApiRequest,
            "tool_usage" => Self::ToolUsage,
            "security_violation" => Self::SecurityViolation,
            "configuration_change" => Self::ConfigurationChange,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Info,
    Warning,
    Error,
    Critical,
}

impl Severity {
    pub fn from_success(success: bool) -> Self {
        if success {
            Self::Info
        } else {
            Self::Warning
        }
    }

    /// INFO below 400 (or when unknown), WARNING for 4xx, ERROR for 5xx and up.
    pub fn from_status(status_code: Option<u16>) -> Self {
        match status_code {
            Some(code) if code >= 500 => Self::Error,
            Some(code) if code >= 400 => Self::Warning,
            _ => Self::Info,
        }
    }
}

/// One append-only audit record. `details` is already redacted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditEvent {
    pub timestamp: DateTime<Utc>,
    pub event_id: Uuid,
    pub event_type: String,
    pub event_code: &'static str,
    pub message: String,
    pub severity: Severity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}
