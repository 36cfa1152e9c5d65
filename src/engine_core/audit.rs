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

//! Structured, redacted audit trail.
//!
//! Every record is built once by [`AuditLogger::log_event`] and handed to
//! each configured [`AuditSink`]. Details are cleaned of sensitive fields and
//! then pattern-redacted before any sink sees them. A failing sink is logged
//! and skipped; auditing never fails the caller.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use parking_lot::Mutex;
use serde_json::Value;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::engine::redactor;
use crate::engine_core::constants::audit;
use crate::engine_core::errors::WardenError;
use crate::engine_core::models::{AuditEvent, EventType, Severity};

/// Destination for audit records.
pub trait AuditSink: Send + Sync {
    fn record(&self, event: &AuditEvent) -> Result<(), WardenError>;

    /// Short name used in diagnostics.
    fn name(&self) -> &str;
}

/// Emits each record as JSON on the `audit` tracing target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&self, event: &AuditEvent) -> Result<(), WardenError> {
        let payload = serde_json::to_string(event)
            .map_err(|e| WardenError::StorageError(e.to_string()))?;
        match event.severity {
            Severity::Info => info!(target: audit::TRACING_TARGET, record = %payload, "SECURITY_AUDIT"),
            Severity::Warning => warn!(target: audit::TRACING_TARGET, record = %payload, "SECURITY_AUDIT"),
            Severity::Error | Severity::Critical => {
                error!(target: audit::TRACING_TARGET, record = %payload, "SECURITY_AUDIT")
            }
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "tracing"
    }
}

/// Appends one JSON object per line to `security_YYYYMMDD.log` in a directory.
///
/// The file rolls over when the UTC date of the record changes.
pub struct JsonLinesAuditSink {
    dir: PathBuf,
    current: Mutex<Option<(String, File)>>,
}

impl JsonLinesAuditSink {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, WardenError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            current: Mutex::new(None),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn file_name_for(date: &str) -> String {
        format!("{}{}.log", audit::FILE_PREFIX, date)
    }

    fn open(&self, date: &str) -> Result<File, WardenError> {
        let path = self.dir.join(Self::file_name_for(date));
        Ok(OpenOptions::new().create(true).append(true).open(path)?)
    }
}

impl AuditSink for JsonLinesAuditSink {
    fn record(&self, event: &AuditEvent) -> Result<(), WardenError> {
        let mut line = serde_json::to_string(event)
            .map_err(|e| WardenError::StorageError(e.to_string()))?;
        line.push('\n');

        let date = event.timestamp.format("%Y%m%d").to_string();
        let mut current = self.current.lock();
        let stale = !matches!(current.as_ref(), Some((d, _)) if *d == date);
        if stale {
            *current = Some((date.clone(), self.open(&date)?));
        }
        if let Some((_, file)) = current.as_mut() {
            file.write_all(line.as_bytes())?;
            file.flush()?;
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "json_lines"
    }
}

/// Keeps records in memory. For tests and embedding hosts that inspect the trail.
#[derive(Default)]
pub struct MemoryAuditSink {
    events: Mutex<Vec<AuditEvent>>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl AuditSink for MemoryAuditSink {
    fn record(&self, event: &AuditEvent) -> Result<(), WardenError> {
        self.events.lock().push(event.clone());
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}

pub struct AuditLogger {
    sinks: Vec<Arc<dyn AuditSink>>,
}

impl Default for AuditLogger {
    fn default() -> Self {
        Self::new(vec![Arc::new(TracingAuditSink)])
    }
}

impl AuditLogger {
    pub fn new(sinks: Vec<Arc<dyn AuditSink>>) -> Self {
        Self { sinks }
    }

    pub fn sink_names(&self) -> Vec<&str> {
        self.sinks.iter().map(|s| s.name()).collect()
    }

    /// Build, redact and emit one record, returning it.
    pub fn log_event(
        &self,
        event_type: EventType,
        message: &str,
        details: Option<&Value>,
        user_id: Option<&str>,
        severity: Severity,
    ) -> AuditEvent {
        let details = details
            .filter(|d| !is_empty_value(d))
            .map(|d| redactor::sanitize_log_value(&redactor::clean_request_data(d)));

        let event = AuditEvent {
            timestamp: Utc::now(),
            event_id: Uuid::new_v4(),
            event_code: event_type.code(),
            event_type: event_type.as_str().to_string(),
            message: redactor::redact_text(message).into_owned(),
            severity,
            user_id: user_id.map(str::to_string),
            details,
        };

        for sink in &self.sinks {
            if let Err(e) = sink.record(&event) {
                warn!(sink = sink.name(), error = %e, "Audit sink failed");
            }
        }
        event
    }

    pub fn log_auth_event(
        &self,
        message: &str,
        user_id: Option<&str>,
        success: bool,
        details: Option<&Value>,
    ) -> AuditEvent {
        self.log_event(
            EventType::Authentication,
            message,
            details,
            user_id,
            Severity::from_success(success),
        )
    }

    pub fn log_access_event(
        &self,
        resource: &str,
        action: &str,
        user_id: Option<&str>,
        success: bool,
        details: Option<&Value>,
    ) -> AuditEvent {
        self.log_event(
            EventType::Authorization,
            &format!("Resource access: {} on {}", action, resource),
            details,
            user_id,
            Severity::from_success(success),
        )
    }

    pub fn log_api_request(
        &self,
        endpoint: &str,
        method: &str,
        user_id: Option<&str>,
        status_code: Option<u16>,
        details: Option<&Value>,
    ) -> AuditEvent {
        let message = match status_code {
            Some(code) => format!("{} {} (Status: {})", method, endpoint, code),
            None => format!("{} {}", method, endpoint),
        };
        self.log_event(
            EventType::ApiRequest,
            &message,
            details,
            user_id,
            Severity::from_status(status_code),
        )
    }

    pub fn log_security_violation(
        &self,
        violation_type: &str,
        message: &str,
        user_id: Option<&str>,
        details: Option<&Value>,
    ) -> AuditEvent {
        self.log_event(
            EventType::SecurityViolation,
            &format!("{}: {}", violation_type, message),
            details,
            user_id,
            Severity::Warning,
        )
    }

    pub fn log_tool_usage(
        &self,
        tool_name: &str,
        action: &str,
        user_id: Option<&str>,
        success: bool,
        details: Option<&Value>,
    ) -> AuditEvent {
        self.log_event(
            EventType::ToolUsage,
            &format!("Tool usage: {} {}", tool_name, action),
            details,
            user_id,
            Severity::from_success(success),
        )
    }

    pub fn log_configuration_change(
        &self,
        message: &str,
        severity: Severity,
        details: Option<&Value>,
    ) -> AuditEvent {
        self.log_event(EventType::ConfigurationChange, message, details, None, severity)
    }
}

// Empty objects and null are dropped rather than recorded.
fn is_empty_value(v: &Value) -> bool {
    match v {
        Value::Null => true,
        Value::Object(m) => m.is_empty(),
        _ => false,
    }
}

/// Details carrying only a length, for events that must not echo the input.
pub fn length_details(field: &str, len: usize) -> Value {
    let mut map = serde_json::Map::new();
    map.insert(field.to_string(), Value::from(len));
    Value::Object(map)
}
