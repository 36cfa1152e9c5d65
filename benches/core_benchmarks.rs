use criterion::{black_box, criterion_group, criterion_main, Criterion};
use lilith_warden::engine::redactor::{clean_request_data, redact_text};
use lilith_warden::engine::request_validator::RequestValidator;
use lilith_warden::engine_core::crypto::TokenSigner;
use lilith_warden::engine_core::session::SessionAuthority;
use serde_json::json;

fn bench_redact_text(c: &mut Criterion) {
    let dirty = "user jane.doe@example.com paid with 4111 1111 1111 1111, call 555-123-4567, key sk-abcdefghijklmnop1234";
    let clean = "the quick brown fox jumps over the lazy dog ".repeat(20);

    c.bench_function("redact_text_dirty", |b| {
        b.iter(|| redact_text(black_box(dirty)))
    });
    c.bench_function("redact_text_clean", |b| {
        b.iter(|| redact_text(black_box(&clean)))
    });
}

fn bench_clean_request_data(c: &mut Criterion) {
    let data = json!({
        "query": "weather in Paris",
        "auth": {"token": "abc", "user": "alice"},
        "items": [{"password": "p"}, {"note": "fine"}]
    });
    c.bench_function("clean_request_data_nested", |b| {
        b.iter(|| clean_request_data(black_box(&data)))
    });
}

fn bench_session_validate(c: &mut Criterion) {
    let authority = SessionAuthority::new(TokenSigner::from_secret("bench-secret").unwrap());
    let session = authority.create("bench-user").unwrap();
    let token = session.access_token;

    c.bench_function("session_validate", |b| {
        b.iter(|| authority.validate(black_box(&token)))
    });
    c.bench_function("session_validate_forged", |b| {
        let forged = format!("{}0", &token[..token.len() - 1]);
        b.iter(|| authority.validate(black_box(&forged)))
    });
}

fn bench_validate_user_message(c: &mut Criterion) {
    let validator = RequestValidator::default();
    let message = "Please summarize the attached quarterly report and list open action items. ".repeat(10);
    c.bench_function("validate_user_message", |b| {
        b.iter(|| validator.validate_user_message(black_box(&message)))
    });
}

criterion_group!(
    benches,
    bench_redact_text,
    bench_clean_request_data,
    bench_session_validate,
    bench_validate_user_message
);
criterion_main!(benches);
