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

//! Malicious content matching.
//!
//! A fixed, case-insensitive list of script-injection and browser-storage
//! patterns shared by request validation and input sanitization. It is
//! independent of the PII patterns in the redactor.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

/// Source expressions, in match order.
pub const MALICIOUS_PATTERNS: &[&str] = &[
    r"<script.*?>.*?</script>",
    r"<script.*?>",
    r"</script>",
    r"javascript:.*?\(",
    r"onerror=",
    r"onload=",
    r"eval\(",
    r"document\.cookie",
    r"localStorage",
    r"sessionStorage",
];

static COMPILED: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    MALICIOUS_PATTERNS
        .iter()
        .filter_map(|p| Regex::new(&format!("(?i){}", p)).ok())
        .collect()
});

pub struct PatternMatcher;

impl PatternMatcher {
    /// True if any pattern occurs anywhere in `text`.
    pub fn is_malicious(text: &str) -> bool {
        COMPILED.iter().any(|re| re.is_match(text))
    }

    /// Replace every match of every pattern with `replacement`, applying the
    /// patterns in order.
    pub fn strip<'a>(text: &'a str, replacement: &str) -> Cow<'a, str> {
        let mut out = Cow::Borrowed(text);
        for re in COMPILED.iter() {
            if re.is_match(&out) {
                out = Cow::Owned(re.replace_all(&out, replacement).into_owned());
            }
        }
        out
    }

    #[cfg(test)]
    pub(crate) fn compiled_count() -> usize {
        COMPILED.len()
    }
}
