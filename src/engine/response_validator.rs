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

//! Outbound validation for agent responses.
//!
//! Responses must be objects carrying a bounded `message`. Anything handed
//! back to a client is stripped of internal fields, and error text has
//! secret-shaped assignments redacted.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::engine_core::constants::{limits, markers, response};
use crate::engine_core::models::ValidationOutcome;

static SECRET_ASSIGNMENTS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)(password|secret|key|token)='[^']+'",
        r#"(?i)(password|secret|key|token)="[^"]+""#,
        r"(?i)(password|secret|key|token)=[^\s,)]+",
    ]
    .iter()
    .filter_map(|p| Regex::new(p).ok())
    .collect()
});

static CONNECTION_STRING: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)ConnectionString=[^\s]*").ok());

/// Envelope returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SafeResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SafeResponse {
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

#[derive(Debug, Clone)]
pub struct ResponseValidator {
    max_response_length: usize,
}

impl Default for ResponseValidator {
    fn default() -> Self {
        Self::new(limits::MAX_RESPONSE_LENGTH)
    }
}

impl ResponseValidator {
    pub fn new(max_response_length: usize) -> Self {
        Self { max_response_length }
    }

    pub fn validate_agent_response(&self, resp: &Value) -> ValidationOutcome {
        let Some(obj) = resp.as_object() else {
            return ValidationOutcome::reject("Response must be a dictionary");
        };
        let Some(message) = obj.get(response::MESSAGE_FIELD) else {
            return ValidationOutcome::reject(format!(
                "Response is missing required field: {}",
                response::MESSAGE_FIELD
            ));
        };
        if let Value::String(text) = message {
            if text.chars().count() > self.max_response_length {
                return ValidationOutcome::reject("Response message is too large");
            }
        }
        ValidationOutcome::accept()
    }

    /// Redact `password|secret|key|token = value` assignments, keeping the key
    /// name, and blank out connection strings.
    pub fn sanitize_error_message(&self, error: &str) -> String {
        sanitize_error_message(error)
    }

    pub fn prepare_safe_response(
        &self,
        success: bool,
        data: Option<&Value>,
        error: Option<&str>,
    ) -> SafeResponse {
        SafeResponse {
            success,
            data: data.map(remove_internal_fields),
            error: error.map(sanitize_error_message),
        }
    }
}

pub fn sanitize_error_message(error: &str) -> String {
    let replacement = format!("${{1}}={}", markers::REDACTED);
    let mut out = error.to_string();
    for re in SECRET_ASSIGNMENTS.iter() {
        out = re.replace_all(&out, replacement.as_str()).into_owned();
    }
    if let Some(re) = CONNECTION_STRING.as_ref() {
        let marker = format!("ConnectionString={}", markers::REDACTED);
        out = re.replace_all(&out, regex::NoExpand(marker.as_str())).into_owned();
    }
    out
}

fn is_internal(key: &str) -> bool {
    key.starts_with(response::INTERNAL_PREFIX) || key == response::INTERNAL_FIELD
}

/// Drop internal keys at every depth, through objects and arrays.
pub fn remove_internal_fields(data: &Value) -> Value {
    match data {
        Value::Object(map) => Value::Object(
            map.iter()
                .filter(|(k, _)| !is_internal(k))
                .map(|(k, v)| (k.clone(), remove_internal_fields(v)))
                .collect::<Map<String, Value>>(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(remove_internal_fields).collect()),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn has_internal_key(v: &Value) -> bool {
        match v {
            Value::Object(m) => m.iter().any(|(k, v)| is_internal(k) || has_internal_key(v)),
            Value::Array(a) => a.iter().any(has_internal_key),
            _ => false,
        }
    }

    #[test]
    fn test_validate_agent_response() {
        let v = ResponseValidator::default();
        assert!(v.validate_agent_response(&json!({"message": "ok"})).is_ok());
        assert!(!v.validate_agent_response(&json!("message")).is_ok());
        assert_eq!(
            v.validate_agent_response(&json!({"text": "x"})).reason(),
            Some("Response is missing required field: message")
        );

        let big = "a".repeat(100_001);
        assert_eq!(
            v.validate_agent_response(&json!({ "message": big })).reason(),
            Some("Response message is too large")
        );
        let edge = "a".repeat(100_000);
        assert!(v.validate_agent_response(&json!({ "message": edge })).is_ok());
    }

    #[test]
    fn test_non_string_message_is_accepted() {
        let v = ResponseValidator::default();
        assert!(v
            .validate_agent_response(&json!({"message": {"parts": []}}))
            .is_ok());

        // Only string messages are length-checked.
        let small = ResponseValidator::new(4);
        assert!(small
            .validate_agent_response(&json!({"message": [1, 2, 3, 4, 5, 6, 7, 8]}))
            .is_ok());
        assert!(!small
            .validate_agent_response(&json!({"message": "abcdefgh"}))
            .is_ok());
    }

    #[test]
    fn test_sanitize_error_message_forms() {
        let single = sanitize_error_message("login failed password='secret123'");
        assert!(single.contains("password=[REDACTED]"));
        assert!(!single.contains("secret123"));

        let double = sanitize_error_message(r#"TOKEN="abc def" rejected"#);
        assert_eq!(double, "TOKEN=[REDACTED] rejected");

        let bare = sanitize_error_message("call(key=abc123, retry=1)");
        assert_eq!(bare, "call(key=[REDACTED], retry=1)");

        let conn = sanitize_error_message("ConnectionString=Server=db;Pwd=x; failed");
        assert_eq!(conn, "ConnectionString=[REDACTED] failed");
    }

    #[test]
    fn test_sanitize_error_message_is_stable() {
        let once = sanitize_error_message("secret=\"p@ss\" and key=v1");
        assert_eq!(sanitize_error_message(&once), once);
    }

    #[test]
    fn test_prepare_safe_response_strips_internal_fields() {
        let v = ResponseValidator::default();
        let data = json!({
            "message": "hi",
            "_trace": "x",
            "internal": {"a": 1},
            "items": [{"id": 1, "_score": 0.3}, {"id": 2, "internal": true}],
            "meta": {"_debug": {"x": 1}, "ok": true}
        });
        let safe = v.prepare_safe_response(true, Some(&data), None);
        let out = safe.data.clone().unwrap();
        assert!(!has_internal_key(&out));
        assert_eq!(
            out,
            json!({
                "message": "hi",
                "items": [{"id": 1}, {"id": 2}],
                "meta": {"ok": true}
            })
        );
        assert_eq!(safe.to_value(), json!({"success": true, "data": out}));
    }

    #[test]
    fn test_prepare_safe_response_error_is_sanitized() {
        let v = ResponseValidator::default();
        let safe = v.prepare_safe_response(false, None, Some("bad token=abc"));
        assert_eq!(safe.error.as_deref(), Some("bad token=[REDACTED]"));
        assert_eq!(
            safe.to_value(),
            json!({"success": false, "error": "bad token=[REDACTED]"})
        );
    }
}
