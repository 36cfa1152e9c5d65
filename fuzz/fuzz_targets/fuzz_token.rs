// Copyright 2026 BadCompany
// Licensed under the Apache License, Version 2.0

#![no_main]

use libfuzzer_sys::fuzz_target;
use lilith_warden::engine_core::crypto::{TokenParts, TokenSigner};
use lilith_warden::engine_core::session::SessionAuthority;
use std::sync::LazyLock;

static AUTHORITY: LazyLock<SessionAuthority> = LazyLock::new(|| {
    let authority = SessionAuthority::new(TokenSigner::from_secret("fuzz-secret").unwrap());
    // One live session so inputs that reuse its id reach the signature check.
    authority.create("fuzz").unwrap();
    authority
});

fuzz_target!(|data: &[u8]| {
    if let Ok(token) = std::str::from_utf8(data) {
        let _ = TokenParts::parse(token);
        // Arbitrary input must never validate and never panic.
        assert!(AUTHORITY.validate(token).is_none());
    }
});
