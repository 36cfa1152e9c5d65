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

//! Authentication guard.
//!
//! Callers check a token explicitly before running a protected operation.

use crate::engine_core::errors::WardenError;
use crate::engine_core::models::Session;
use crate::engine_core::session::SessionAuthority;

/// Resolve `token` to its live session or fail with a cause-free
/// [`WardenError::AuthenticationError`].
pub fn require_session(authority: &SessionAuthority, token: &str) -> Result<Session, WardenError> {
    authority
        .validate(token)
        .ok_or(WardenError::AuthenticationError)
}

/// Run `op` with the session only if `token` is valid.
pub fn with_session<T, F>(authority: &SessionAuthority, token: &str, op: F) -> Result<T, WardenError>
where
    F: FnOnce(&Session) -> T,
{
    let session = require_session(authority, token)?;
    Ok(op(&session))
}

/// Strip an optional `Bearer ` prefix from an authorization value.
pub fn bearer_token(header: &str) -> &str {
    let trimmed = header.trim();
    match trimmed.get(..7) {
        Some(prefix) if prefix.eq_ignore_ascii_case("bearer ") => trimmed[7..].trim_start(),
        _ => trimmed,
    }
}
