// Copyright 2026 BadCompany
// Licensed under the Apache License, Version 2.0

#![no_main]

use libfuzzer_sys::fuzz_target;
use lilith_warden::engine::redactor::{clean_request_data, redact_text, sanitize_log_value};
use lilith_warden::engine::request_validator::RequestValidator;
use lilith_warden::engine::response_validator::{
    remove_internal_fields, sanitize_error_message, ResponseValidator,
};

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        let _ = redact_text(text);
        let _ = sanitize_error_message(text);
        let _ = RequestValidator::default().validate_user_message(text);
    }

    if let Ok(value) = serde_json::from_slice::<serde_json::Value>(data) {
        let _ = clean_request_data(&value);
        let _ = sanitize_log_value(&value);
        let _ = remove_internal_fields(&value);
        let _ = RequestValidator::default().sanitize_input(&value);
        let _ = ResponseValidator::default().validate_agent_response(&value);
    }
});
