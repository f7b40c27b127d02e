//! Property-based tests for error classification and normalization
//!
//! These verify invariants that must hold for any status code, body, or key.

use abstractapi_core::http::normalize_response;
use abstractapi_core::{ErrorClassification, ServiceError};
use proptest::prelude::*;

/// Strategy for plausible API keys
fn api_key_strategy() -> impl Strategy<Value = String> {
    "[a-f0-9]{24,40}"
}

/// Strategy for upstream error bodies that may echo the key
fn echoing_body_strategy(key: String) -> impl Strategy<Value = Vec<u8>> {
    prop_oneof![
        Just(format!(r#"{{"error": {{"message": "bad key {}"}}}}"#, key)),
        Just(format!(r#"{{"message": "api_key={} rejected"}}"#, key)),
        Just(format!("plain text mentioning {}", key)),
        "[a-zA-Z ]{0,40}",
    ]
    .prop_map(String::into_bytes)
}

proptest! {
    #[test]
    fn every_5xx_is_upstream_service(status in 500u16..600) {
        prop_assert_eq!(
            ErrorClassification::from_status(status),
            ErrorClassification::UpstreamService
        );
    }

    #[test]
    fn status_classification_never_yields_local_kinds(status in 100u16..600) {
        let kind = ErrorClassification::from_status(status);
        prop_assert_ne!(kind, ErrorClassification::Configuration);
        prop_assert_ne!(kind, ErrorClassification::MalformedResponse);
        prop_assert_ne!(kind, ErrorClassification::InvalidArgument);
    }

    #[test]
    fn status_error_messages_never_leak_key(
        (key, body) in api_key_strategy().prop_flat_map(|key| {
            (Just(key.clone()), echoing_body_strategy(key))
        }),
        status in 400u16..600,
    ) {
        let err = ServiceError::from_status(status, &body, Some(&key));
        prop_assert!(!err.message.contains(&key));
        prop_assert!(!err.to_string().contains(&key));
        prop_assert_eq!(err.status_code, Some(status));
    }

    #[test]
    fn arbitrary_objects_pass_through(
        entries in proptest::collection::btree_map("[a-z_]{1,12}", "[a-zA-Z0-9 ]{0,20}", 0..8)
    ) {
        let object: serde_json::Map<String, serde_json::Value> = entries
            .into_iter()
            .map(|(k, v)| (k, serde_json::Value::String(v)))
            .collect();
        let body = serde_json::to_vec(&object).unwrap();
        let normalized = normalize_response(&body).unwrap();
        prop_assert_eq!(normalized, object);
    }

    #[test]
    fn non_object_json_is_malformed(values in proptest::collection::vec(any::<i64>(), 0..5)) {
        let body = serde_json::to_vec(&values).unwrap();
        let err = normalize_response(&body).unwrap_err();
        prop_assert_eq!(err.classification, ErrorClassification::MalformedResponse);
    }
}
