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

//! PII and secret redaction.
//!
//! Two independent passes:
//! - [`redact_text`] erases sensitive substrings by pattern.
//! - [`clean_request_data`] erases whole values under sensitive field names.
//!
//! Callers compose them when both are needed; the audit logger does.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};

use crate::engine_core::constants::markers;

/// Pattern rules, applied in this order. Each match becomes `[REDACTED-<LABEL>]`.
pub const SENSITIVE_PATTERNS: &[(&str, &str)] = &[
    ("CREDIT_CARD", r"\b(?:\d{4}[-\s]?){3}\d{4}\b"),
    ("SSN", r"\b\d{3}-\d{2}-\d{4}\b"),
    (
        "API_KEY",
        r"\b(?:key-|sk-|pk-|token=|api_key=|apikey=)([a-zA-Z0-9_-]{16,})\b",
    ),
    (
        "EMAIL",
        r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Z|a-z]{2,}\b",
    ),
    (
        "PHONE",
        r"\b(?:\+\d{1,2}\s)?\(?\d{3}\)?[\s.-]?\d{3}[\s.-]?\d{4}\b",
    ),
];

/// Field names whose values are always replaced, compared case-insensitively.
pub const SENSITIVE_KEYS: &[&str] = &["api_key", "token", "password", "secret", "credential"];

struct Rule {
    regex: Regex,
    marker: String,
}

static RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    SENSITIVE_PATTERNS
        .iter()
        .filter_map(|(label, pattern)| {
            Regex::new(pattern).ok().map(|regex| Rule {
                regex,
                marker: format!("[REDACTED-{}]", label),
            })
        })
        .collect()
});

/// Replace credit cards, SSNs, API keys, emails and phone numbers with
/// typed markers. Idempotent.
pub fn redact_text(text: &str) -> Cow<'_, str> {
    let mut out = Cow::Borrowed(text);
    for rule in RULES.iter() {
        if rule.regex.is_match(&out) {
            out = Cow::Owned(
                rule.regex
                    .replace_all(&out, regex::NoExpand(&rule.marker))
                    .into_owned(),
            );
        }
    }
    out
}

pub fn is_sensitive_key(key: &str) -> bool {
    SENSITIVE_KEYS
        .iter()
        .any(|candidate| key.eq_ignore_ascii_case(candidate))
}

/// Deep copy of `data` where every value under a sensitive key, whatever its
/// shape, is replaced by `[REDACTED]`.
pub fn clean_request_data(data: &Value) -> Value {
    match data {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| {
                    let cleaned = if is_sensitive_key(k) {
                        Value::String(markers::REDACTED.to_string())
                    } else {
                        clean_request_data(v)
                    };
                    (k.clone(), cleaned)
                })
                .collect::<Map<String, Value>>(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(clean_request_data).collect()),
        other => other.clone(),
    }
}

/// Run [`redact_text`] over every string value and every key, at any depth.
pub fn sanitize_log_value(data: &Value) -> Value {
    match data {
        Value::String(s) => Value::String(redact_text(s).into_owned()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (redact_text(k).into_owned(), sanitize_log_value(v)))
                .collect::<Map<String, Value>>(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(sanitize_log_value).collect()),
        other => other.clone(),
    }
}
