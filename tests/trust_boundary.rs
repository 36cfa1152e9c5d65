use lilith_warden::engine::redactor::{clean_request_data, is_sensitive_key, redact_text};
use lilith_warden::engine::request_validator::RequestValidator;
use lilith_warden::engine::response_validator::{
    remove_internal_fields, sanitize_error_message, ResponseValidator,
};
use proptest::prelude::*;
use serde_json::{json, Map, Value};

const SENSITIVE_SAMPLES: &[&str] = &[
    "4111 1111 1111 1111",
    "4111-1111-1111-1111",
    "123-45-6789",
    "sk-abcdefghijklmnop1234",
    "token=ABCDEFGHIJKLMNOPQRST",
    "jane.doe@example.com",
    "(555) 123-4567",
    "+1 555.123.4567",
    "nothing to see",
];

fn no_sensitive_leak(v: &Value) -> bool {
    match v {
        Value::Object(map) => map.iter().all(|(k, v)| {
            if is_sensitive_key(k) {
                v == &Value::String("[REDACTED]".to_string())
            } else {
                no_sensitive_leak(v)
            }
        }),
        Value::Array(items) => items.iter().all(no_sensitive_leak),
        _ => true,
    }
}

fn no_internal_keys(v: &Value) -> bool {
    match v {
        Value::Object(map) => map
            .iter()
            .all(|(k, v)| !k.starts_with('_') && k != "internal" && no_internal_keys(v)),
        Value::Array(items) => items.iter().all(no_internal_keys),
        _ => true,
    }
}

fn json_tree(keys: &'static [&'static str]) -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        "[a-z0-9 ]{0,12}".prop_map(Value::from),
    ];
    leaf.prop_recursive(4, 48, 6, move |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::vec((prop::sample::select(keys), inner), 0..5).prop_map(
                |entries| {
                    Value::Object(
                        entries
                            .into_iter()
                            .map(|(k, v)| (k.to_string(), v))
                            .collect::<Map<String, Value>>(),
                    )
                }
            ),
        ]
    })
}

const REQUEST_KEYS: &[&str] = &[
    "note", "query", "password", "Password", "TOKEN", "secret", "api_key", "API_KEY",
    "credential", "nested", "items", "tokens",
];

const RESPONSE_KEYS: &[&str] = &[
    "message", "data", "_trace", "_", "internal", "Internal", "items", "meta", "internal_id",
];

#[test]
fn test_clean_request_data_example() {
    assert_eq!(
        clean_request_data(&json!({"token": "abc", "note": "fine"})),
        json!({"token": "[REDACTED]", "note": "fine"})
    );
}

#[test]
fn test_user_message_examples() {
    let v = RequestValidator::default();
    assert!(!v.validate_user_message("<script>alert(1)</script>").is_ok());
    assert!(v.validate_user_message("hello world").is_ok());

    let long = "A".repeat(40_000);
    let outcome = v.validate_user_message(&long);
    assert!(outcome.reason().unwrap().contains("maximum length"));
}

#[test]
fn test_sanitize_error_message_example() {
    let out = sanitize_error_message("password='secret123'");
    assert!(out.contains("password=[REDACTED]"));
    assert!(!out.contains("secret123"));
}

#[test]
fn test_prepare_safe_response_strips_nested_internals() {
    let v = ResponseValidator::default();
    let resp = json!({
        "message": "done",
        "_debug": {"prompt": "..."},
        "internal": true,
        "results": [{"id": 1, "_score": 0.4, "meta": {"internal": "x", "ok": 1}}]
    });
    let safe = v.prepare_safe_response(true, Some(&resp), None).to_value();
    assert_eq!(
        safe,
        json!({
            "success": true,
            "data": {"message": "done", "results": [{"id": 1, "meta": {"ok": 1}}]}
        })
    );
}

proptest! {
    #[test]
    fn test_redact_text_is_idempotent(
        prefix in "[a-z ]{0,20}",
        sample in prop::sample::select(SENSITIVE_SAMPLES),
        suffix in "[a-z ]{0,20}",
    ) {
        let text = format!("{} {} {}", prefix, sample, suffix);
        let once = redact_text(&text).into_owned();
        let twice = redact_text(&once).into_owned();
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn test_redact_text_handles_arbitrary_input(text in "\\PC{0,200}") {
        let _ = redact_text(&text);
    }

    #[test]
    fn test_clean_request_data_leaves_no_secret(data in json_tree(REQUEST_KEYS)) {
        let cleaned = clean_request_data(&data);
        prop_assert!(no_sensitive_leak(&cleaned));
    }

    #[test]
    fn test_safe_response_has_no_internal_keys(data in json_tree(RESPONSE_KEYS)) {
        prop_assert!(no_internal_keys(&remove_internal_fields(&data)));

        let envelope = ResponseValidator::default()
            .prepare_safe_response(true, Some(&data), None)
            .to_value();
        prop_assert!(no_internal_keys(&envelope["data"]));
    }

    #[test]
    fn test_sanitize_input_never_panics(data in json_tree(REQUEST_KEYS)) {
        let v = RequestValidator::default();
        let _ = v.sanitize_input(&data);
    }
}
