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

//! Inbound validation for user messages and tool-call parameters.

use serde_json::{Map, Value};

use crate::engine::pattern_matcher::PatternMatcher;
use crate::engine_core::constants::{limits, markers};
use crate::engine_core::models::ValidationOutcome;

#[derive(Debug, Clone)]
pub struct RequestValidator {
    max_message_length: usize,
}

impl Default for RequestValidator {
    fn default() -> Self {
        Self::new(limits::MAX_MESSAGE_LENGTH)
    }
}

impl RequestValidator {
    pub fn new(max_message_length: usize) -> Self {
        Self { max_message_length }
    }

    pub fn max_message_length(&self) -> usize {
        self.max_message_length
    }

    /// Length is counted in characters, not bytes.
    pub fn validate_user_message(&self, message: &str) -> ValidationOutcome {
        if message.is_empty() {
            return ValidationOutcome::reject("Message cannot be empty");
        }
        if message.chars().count() > self.max_message_length {
            return ValidationOutcome::reject(format!(
                "Message exceeds maximum length of {} characters",
                self.max_message_length
            ));
        }
        if PatternMatcher::is_malicious(message) {
            return ValidationOutcome::reject("Message contains potentially harmful content");
        }
        ValidationOutcome::accept()
    }

    /// Only first-level string values are scanned.
    pub fn validate_tool_parameters(&self, tool_name: &str, parameters: &Value) -> ValidationOutcome {
        if tool_name.is_empty() {
            return ValidationOutcome::reject("Tool name cannot be empty");
        }
        let Some(params) = parameters.as_object() else {
            return ValidationOutcome::reject("Parameters must be a dictionary");
        };
        for (key, value) in params {
            if let Value::String(s) = value {
                if PatternMatcher::is_malicious(s) {
                    return ValidationOutcome::reject(format!(
                        "Parameter '{}' contains potentially harmful content",
                        key
                    ));
                }
            }
        }
        ValidationOutcome::accept()
    }

    /// Replace malicious matches with `[REMOVED]` in every string, at any depth.
    pub fn sanitize_input(&self, data: &Value) -> Value {
        sanitize_value(data)
    }
}

fn sanitize_value(data: &Value) -> Value {
    match data {
        Value::String(s) => Value::String(PatternMatcher::strip(s, markers::REMOVED).into_owned()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), sanitize_value(v)))
                .collect::<Map<String, Value>>(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(sanitize_value).collect()),
        other => other.clone(),
    }
}
