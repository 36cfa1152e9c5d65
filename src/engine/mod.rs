//! Trust-boundary engine.
//!
//! Pattern matching, request and response validation, and redaction. All
//! functions here are pure: they classify or transform and never fail.

pub mod pattern_matcher;
pub mod redactor;
pub mod request_validator;
pub mod response_validator;
