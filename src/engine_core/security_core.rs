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

//! Security Facade.
//!
//! The single entry point collaborators use for credential access, session
//! lifecycle, trust-boundary validation and sanitization. Every
//! security-relevant outcome is written to the audit trail before it is
//! returned. The host constructs one facade and shares it by `Arc`.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::{json, Value};
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::WardenConfig;
use crate::credentials::{self, CredentialRegistry};
use crate::engine::redactor;
use crate::engine::request_validator::RequestValidator;
use crate::engine::response_validator::{ResponseValidator, SafeResponse};
use crate::engine_core::audit::{self, AuditLogger, AuditSink, JsonLinesAuditSink, TracingAuditSink};
use crate::engine_core::auth;
use crate::engine_core::constants::response;
use crate::engine_core::crypto::TokenSigner;
use crate::engine_core::errors::WardenError;
use crate::engine_core::models::{
    AuditEvent, CredentialInfo, CredentialScope, KeyStatus, Session, Severity, ValidationOutcome,
};
use crate::engine_core::session::SessionAuthority;
use crate::engine_core::types::CredentialValue;
use crate::utils::security::mask_key;
use crate::utils::time::SystemClock;

pub struct SecurityFacade {
    registry: CredentialRegistry,
    sessions: SessionAuthority,
    requests: RequestValidator,
    responses: ResponseValidator,
    audit: AuditLogger,
}

impl SecurityFacade {
    /// Build every component from configuration.
    pub fn new(config: &WardenConfig) -> Result<Self, WardenError> {
        config.validate()?;

        let store = credentials::open_store(config)?;
        let registry = CredentialRegistry::with_default_catalog(store)?
            .with_env_fallback(config.env_fallback);

        let signer = match config.auth_secret.as_deref() {
            Some(secret) => TokenSigner::from_secret(secret)?,
            None => TokenSigner::try_new()?,
        };
        let sessions =
            SessionAuthority::with_clock(signer, config.session_ttl(), Arc::new(SystemClock));

        let mut sinks: Vec<Arc<dyn AuditSink>> = vec![Arc::new(TracingAuditSink)];
        if let Some(dir) = &config.audit_log_dir {
            sinks.push(Arc::new(JsonLinesAuditSink::new(dir)?));
        }

        info!(
            backend = registry.backend_name(),
            audit_sinks = sinks.len(),
            "Security facade initialized"
        );
        Ok(Self::from_parts(
            registry,
            sessions,
            AuditLogger::new(sinks),
            config,
        ))
    }

    /// Assemble a facade from prebuilt components. Limits come from `config`.
    pub fn from_parts(
        registry: CredentialRegistry,
        sessions: SessionAuthority,
        audit: AuditLogger,
        config: &WardenConfig,
    ) -> Self {
        Self {
            registry,
            sessions,
            requests: RequestValidator::new(config.max_message_length),
            responses: ResponseValidator::new(config.max_response_length),
            audit,
        }
    }

    pub fn registry(&self) -> &CredentialRegistry {
        &self.registry
    }

    pub fn sessions(&self) -> &SessionAuthority {
        &self.sessions
    }

    pub fn audit(&self) -> &AuditLogger {
        &self.audit
    }

    // -----------------------------------------------------------------------
    // Credentials
    // -----------------------------------------------------------------------

    /// Presence and validity of every catalog key. Missing required keys and
    /// malformed present keys are each recorded as a configuration event.
    pub fn validate_api_keys(&self) -> BTreeMap<String, KeyStatus> {
        let results = self.registry.key_status();
        for def in self.registry.catalog() {
            let Some(status) = results.get(&def.key) else {
                continue;
            };
            if status.required && !status.present {
                self.audit.log_configuration_change(
                    &format!("Required API key missing: {}", def.key),
                    Severity::Error,
                    None,
                );
            } else if status.present && !status.valid {
                self.audit.log_configuration_change(
                    &format!("API key has invalid format: {}", def.key),
                    Severity::Warning,
                    None,
                );
            }
        }
        results
    }

    /// Look up a credential and record a masked access event.
    pub fn get_credential(&self, key: &str) -> Option<CredentialValue> {
        let value = self.registry.get(key);
        let resource = format!("api_key:{}", key);
        match &value {
            Some(v) => self.audit.log_access_event(
                &resource,
                "read",
                None,
                true,
                Some(&json!({ "masked_key": mask_key(v.expose()) })),
            ),
            None => self.audit.log_access_event(
                &resource,
                "read",
                None,
                false,
                Some(&json!({ "error": "Key not found" })),
            ),
        };
        value
    }

    pub fn get_api_key(&self, key: &str) -> Option<CredentialValue> {
        self.get_credential(key)
    }

    pub fn validate_credentials(&self, scope: Option<CredentialScope>) -> (bool, Vec<String>) {
        self.registry.validate(scope)
    }

    pub fn credential_info(&self) -> BTreeMap<String, CredentialInfo> {
        self.registry.credential_info()
    }

    pub fn credentials_for_scope(&self, scope: CredentialScope) -> BTreeMap<String, CredentialValue> {
        self.registry.credentials_for_scope(scope)
    }

    pub fn missing_credentials(&self) -> BTreeMap<CredentialScope, Vec<String>> {
        self.registry.missing_by_scope()
    }

    /// Store a credential. Storage failures are logged and reported as `false`.
    pub fn set_credential(&self, key: &str, value: &str) -> bool {
        self.store_change(key, "updated", || self.registry.set(key, value))
    }

    pub fn delete_credential(&self, key: &str) -> bool {
        self.store_change(key, "deleted", || self.registry.delete(key))
    }

    fn store_change<F>(&self, key: &str, verb: &str, op: F) -> bool
    where
        F: FnOnce() -> Result<(), WardenError>,
    {
        let details = json!({ "backend": self.registry.backend_name() });
        match op() {
            Ok(()) => {
                self.audit.log_configuration_change(
                    &format!("Credential {}: {}", verb, key),
                    Severity::Info,
                    Some(&details),
                );
                true
            }
            Err(e) => {
                warn!(key, error = %e, "Credential store write failed");
                self.audit.log_configuration_change(
                    &format!("Credential not {}: {}", verb, key),
                    Severity::Error,
                    Some(&details),
                );
                false
            }
        }
    }

    // -----------------------------------------------------------------------
    // Sessions
    // -----------------------------------------------------------------------

    pub fn create_session(&self, user_id: &str) -> Result<Session, WardenError> {
        match self.sessions.create(user_id) {
            Ok(session) => {
                self.audit.log_auth_event(
                    "Session created",
                    Some(user_id),
                    true,
                    Some(&json!({ "session_id": session.session_id })),
                );
                Ok(session)
            }
            Err(e) => {
                self.audit
                    .log_auth_event("Session creation rejected", None, false, None);
                Err(e)
            }
        }
    }

    pub fn validate_session(&self, token: &str) -> Option<Session> {
        let session = self.sessions.validate(token);
        self.log_validation(session.as_ref());
        session
    }

    /// Explicit guard for protected operations.
    pub fn require_session(&self, token: &str) -> Result<Session, WardenError> {
        let result = auth::require_session(&self.sessions, token);
        self.log_validation(result.as_ref().ok());
        result
    }

    fn log_validation(&self, session: Option<&Session>) {
        match session {
            Some(s) => self.audit.log_auth_event(
                "Session validated",
                Some(&s.user_id),
                true,
                Some(&json!({ "session_id": s.session_id })),
            ),
            None => self
                .audit
                .log_auth_event("Invalid session token", None, false, None),
        };
    }

    pub fn end_session(&self, session_id: &Uuid) -> bool {
        let found = self.sessions.invalidate(session_id);
        self.audit.log_auth_event(
            "Session ended",
            None,
            found,
            Some(&json!({ "session_id": session_id })),
        );
        found
    }

    // -----------------------------------------------------------------------
    // Trust boundary
    // -----------------------------------------------------------------------

    pub fn validate_user_message(&self, message: &str) -> ValidationOutcome {
        let outcome = self.requests.validate_user_message(message);
        if let Some(reason) = outcome.reason() {
            self.audit.log_security_violation(
                "input_validation",
                &format!("Invalid user message: {}", reason),
                None,
                Some(&audit::length_details("message_length", message.chars().count())),
            );
        }
        outcome
    }

    pub fn validate_tool_call(
        &self,
        tool_name: &str,
        parameters: &Value,
        user_id: Option<&str>,
    ) -> ValidationOutcome {
        let outcome = self.requests.validate_tool_parameters(tool_name, parameters);
        let mut details = json!({
            "tool_name": tool_name,
            "parameters": redactor::clean_request_data(parameters),
        });
        match outcome.reason() {
            Some(reason) => {
                details["error"] = Value::from(reason);
                self.audit.log_security_violation(
                    "tool_validation",
                    &format!("Invalid tool call: {}", reason),
                    user_id,
                    Some(&details),
                );
            }
            None => {
                self.audit
                    .log_tool_usage(tool_name, "call", user_id, true, Some(&details));
            }
        }
        outcome
    }

    /// Validate an agent response and wrap it for the client. A malformed
    /// response yields a generic error envelope; the cause stays in the audit
    /// trail.
    pub fn sanitize_response(&self, resp: &Value, user_id: Option<&str>) -> SafeResponse {
        let outcome = self.responses.validate_agent_response(resp);
        if let Some(reason) = outcome.reason() {
            self.audit.log_security_violation(
                "response_validation",
                &format!("Invalid response format: {}", reason),
                user_id,
                None,
            );
            return self.responses.prepare_safe_response(
                false,
                None,
                Some(response::GENERIC_FORMAT_ERROR),
            );
        }
        self.responses.prepare_safe_response(true, Some(resp), None)
    }

    pub fn sanitize_input(&self, data: &Value) -> Value {
        self.requests.sanitize_input(data)
    }

    pub fn sanitize_error_message(&self, error: &str) -> String {
        self.responses.sanitize_error_message(error)
    }

    pub fn redact_text(&self, text: &str) -> String {
        redactor::redact_text(text).into_owned()
    }

    pub fn log_api_request(
        &self,
        endpoint: &str,
        method: &str,
        user_id: Option<&str>,
        status_code: Option<u16>,
        details: Option<&Value>,
    ) -> AuditEvent {
        self.audit
            .log_api_request(endpoint, method, user_id, status_code, details)
    }
}
