use std::collections::HashSet;
use std::sync::Arc;
use std::thread;

use chrono::{DateTime, Duration, Utc};
use lilith_warden::engine_core::crypto::TokenSigner;
use lilith_warden::engine_core::session::SessionAuthority;
use lilith_warden::utils::time::ManualClock;
use proptest::prelude::*;

fn authority() -> SessionAuthority {
    SessionAuthority::new(TokenSigner::from_secret("integration-secret").unwrap())
}

#[test]
fn test_token_valid_until_session_ended() {
    let auth = authority();
    let session = auth.create("alice").unwrap();
    let token = session.access_token.clone();

    let validated = auth.validate(&token).expect("fresh token must validate");
    assert_eq!(validated.user_id, "alice");
    assert_eq!(validated.session_id, session.session_id);

    assert!(auth.invalidate(&session.session_id));
    assert!(auth.validate(&token).is_none());
    // Ending twice is harmless.
    assert!(auth.invalidate(&session.session_id));
    assert!(auth.validate(&token).is_none());
}

#[test]
fn test_token_format() {
    let auth = authority();
    let session = auth.create("bob").unwrap();
    let segments: Vec<&str> = session.access_token.split('.').collect();
    assert_eq!(segments.len(), 3);
    assert_eq!(segments[0], session.session_id.to_string());

    let (user, ts) = segments[1].split_once(':').unwrap();
    assert_eq!(user, "bob");
    assert_eq!(ts.parse::<i64>().unwrap(), session.created_at.timestamp());

    assert_eq!(segments[2].len(), 64);
    assert!(segments[2].chars().all(|c| c.is_ascii_hexdigit()));
}

#[test]
fn test_expired_session_fails_with_valid_signature() {
    let start: DateTime<Utc> = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
    let clock = Arc::new(ManualClock::new(start));
    let auth = SessionAuthority::with_clock(
        TokenSigner::from_secret("integration-secret").unwrap(),
        Duration::hours(1),
        clock.clone(),
    );
    let session = auth.create("carol").unwrap();

    clock.advance(Duration::minutes(59));
    assert!(auth.validate(&session.access_token).is_some());

    clock.advance(Duration::minutes(2));
    assert!(auth.validate(&session.access_token).is_none());
}

#[test]
fn test_token_from_another_server_rejected() {
    let ours = authority();
    let theirs = SessionAuthority::new(TokenSigner::from_secret("other-secret").unwrap());
    let session = theirs.create("mallory").unwrap();
    assert!(ours.validate(&session.access_token).is_none());
}

#[test]
fn test_malformed_tokens_rejected() {
    let auth = authority();
    for token in ["", "abc", "a.b", "a.b.c.d", "not-a-uuid.alice:1.deadbeef"] {
        assert!(auth.validate(token).is_none(), "{:?} should be rejected", token);
    }
}

#[test]
fn test_concurrent_sessions_are_distinct_and_valid() {
    const THREADS: usize = 16;
    const PER_THREAD: usize = 25;

    let auth = Arc::new(authority());
    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let auth = auth.clone();
            thread::spawn(move || {
                (0..PER_THREAD)
                    .map(|i| auth.create(&format!("user-{}-{}", t, i)).unwrap())
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let sessions: Vec<_> = handles
        .into_iter()
        .flat_map(|h| h.join().unwrap())
        .collect();
    assert_eq!(sessions.len(), THREADS * PER_THREAD);

    let ids: HashSet<_> = sessions.iter().map(|s| s.session_id).collect();
    assert_eq!(ids.len(), THREADS * PER_THREAD);

    for s in &sessions {
        let v = auth.validate(&s.access_token).unwrap();
        assert_eq!(v.user_id, s.user_id);
    }
    assert_eq!(auth.active_count(), THREADS * PER_THREAD);
}

proptest! {
    #[test]
    fn test_flipping_any_signature_char_fails(idx in 0usize..64, replacement in any::<char>()) {
        let auth = authority();
        let session = auth.create("alice").unwrap();
        let token = session.access_token;

        let sig_start = token.rfind('.').unwrap() + 1;
        let sig: Vec<char> = token[sig_start..].chars().collect();
        prop_assume!(sig[idx] != replacement);

        let mut flipped: Vec<char> = sig.clone();
        flipped[idx] = replacement;
        let forged = format!("{}{}", &token[..sig_start], flipped.into_iter().collect::<String>());

        prop_assert!(auth.validate(&forged).is_none());
        prop_assert!(auth.validate(&token).is_some());
    }

    #[test]
    fn test_validate_never_panics_on_garbage(token in "\\PC{0,200}") {
        let auth = authority();
        let _ = auth.validate(&token);
    }
}
