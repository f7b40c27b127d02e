//! End-to-end tests of the operation handlers over real HTTP
//!
//! A local wiremock server stands in for the upstream service.


use abstractapi_core::{AbstractClient, ErrorClassification};
use pretty_assertions::assert_eq;
use serde_json::{json, Map, Value};
use std::time::Duration;
use test_support::*;
use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn json_response(status: u16, body: &str) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_raw(body.as_bytes().to_vec(), "application/json")
}

#[tokio::test]
async fn test_verify_email_passes_mapping_through() {
    let server = MockServer::start().await;
    let body = r#"{"email": "user@example.com", "deliverability": "DELIVERABLE", "is_valid_format": {"value": true, "text": "TRUE"}}"#;

    Mock::given(method("GET"))
        .and(path(EMAIL_PATH))
        .and(query_param("api_key", TEST_API_KEY))
        .and(query_param("email", "user@example.com"))
        .respond_with(json_response(200, body))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, Some(TEST_API_KEY));
    let result = client.verify_email("user@example.com").await.unwrap();

    assert_eq!(
        Value::Object(result),
        json!({
            "email": "user@example.com",
            "deliverability": "DELIVERABLE",
            "is_valid_format": {"value": true, "text": "TRUE"}
        })
    );
}

#[tokio::test]
async fn test_malformed_email_is_still_forwarded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(EMAIL_PATH))
        .and(query_param("email", "not an email+@@"))
        .respond_with(json_response(200, r#"{"is_valid_format": {"value": false, "text": "FALSE"}}"#))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, Some(TEST_API_KEY));
    let result = client.verify_email("not an email+@@").await.unwrap();
    assert_eq!(result["is_valid_format"]["value"], json!(false));
}

#[tokio::test]
async fn test_validate_phone_omits_country_when_absent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(PHONE_PATH))
        .and(query_param("phone", "14152007986"))
        .and(query_param_is_missing("country"))
        .respond_with(json_response(200, r#"{"phone": "14152007986", "valid": true}"#))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, Some(TEST_API_KEY));
    let result = client.validate_phone("14152007986", None).await.unwrap();
    assert_eq!(result["valid"], json!(true));
}

#[tokio::test]
async fn test_validate_phone_includes_country_when_given() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(PHONE_PATH))
        .and(query_param("phone", "14152007986"))
        .and(query_param("country", "US"))
        .respond_with(json_response(
            200,
            r#"{"phone": "14152007986", "valid": true, "country": {"code": "US", "name": "United States", "prefix": "+1"}}"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, Some(TEST_API_KEY));
    let result = client.validate_phone("14152007986", Some("US")).await.unwrap();
    assert_eq!(result["country"]["prefix"], json!("+1"));
}

#[tokio::test]
async fn test_reputation_uses_its_own_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(REPUTATION_PATH))
        .and(query_param("email", "user@example.com"))
        .respond_with(json_response(
            200,
            r#"{"email_address": "user@example.com", "email_risk": {"address_risk_status": "low", "domain_risk_status": "low"}}"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, Some(TEST_API_KEY));
    let result = client.check_email_reputation("user@example.com").await.unwrap();
    assert_eq!(result["email_risk"]["address_risk_status"], json!("low"));
}

#[tokio::test]
async fn test_missing_key_never_reaches_network() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(json_response(200, "{}"))
        .expect(0)
        .mount(&server)
        .await;

    let client = client_for(&server, None);
    let outcomes = [
        client.verify_email("user@example.com").await,
        client.validate_phone("14152007986", Some("US")).await,
        client.check_email_reputation("user@example.com").await,
    ];

    for outcome in outcomes {
        let err = outcome.unwrap_err();
        assert_eq!(err.classification, ErrorClassification::Configuration);
        assert_eq!(err.message, "API key not configured");
    }
    assert_eq!(request_count(&server).await, 0);
}

#[tokio::test]
async fn test_rate_limit_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(json_response(429, r#"{"error": {"message": "Too many requests"}}"#))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, Some(TEST_API_KEY));
    let err = client.verify_email("user@example.com").await.unwrap_err();

    assert_eq!(err.classification, ErrorClassification::RateLimit);
    assert_eq!(err.status_code, Some(429));
    assert_eq!(request_count(&server).await, 1);
}

#[tokio::test]
async fn test_unauthorized_does_not_echo_key() {
    let server = MockServer::start().await;
    let echoing_body = format!(
        r#"{{"error": {{"message": "Invalid api_key={} provided", "code": "unauthorized"}}}}"#,
        TEST_API_KEY
    );
    Mock::given(method("GET"))
        .respond_with(json_response(401, &echoing_body))
        .mount(&server)
        .await;

    let client = client_for(&server, Some(TEST_API_KEY));
    for err in [
        client.verify_email("user@example.com").await.unwrap_err(),
        client.validate_phone("14152007986", None).await.unwrap_err(),
        client
            .check_email_reputation("user@example.com")
            .await
            .unwrap_err(),
    ] {
        assert_eq!(err.classification, ErrorClassification::Authentication);
        assert!(!err.message.contains(TEST_API_KEY));
        assert!(!err.to_string().contains(TEST_API_KEY));
    }
}

#[tokio::test]
async fn test_status_table() {
    let cases = [
        (400, ErrorClassification::InvalidInput),
        (403, ErrorClassification::Authentication),
        (422, ErrorClassification::InvalidInput),
        (500, ErrorClassification::UpstreamService),
        (503, ErrorClassification::UpstreamService),
    ];

    for (status, expected) in cases {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(status).set_body_string("oops"))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, Some(TEST_API_KEY));
        let err = client.validate_phone("14152007986", None).await.unwrap_err();
        assert_eq!(err.classification, expected, "status {}", status);
        assert_eq!(err.status_code, Some(status));
    }
}

#[tokio::test]
async fn test_malformed_success_bodies() {
    for body in ["this is not json", r#"[{"email": "user@example.com"}]"#, ""] {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(json_response(200, body))
            .mount(&server)
            .await;

        let client = client_for(&server, Some(TEST_API_KEY));
        let err = client.verify_email("user@example.com").await.unwrap_err();
        assert_eq!(err.classification, ErrorClassification::MalformedResponse);
    }
}

#[tokio::test]
async fn test_slow_upstream_times_out_as_network_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(json_response(200, "{}").set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;

    let client = client_for(&server, Some(TEST_API_KEY));
    let err = client.verify_email("user@example.com").await.unwrap_err();

    assert_eq!(err.classification, ErrorClassification::Network);
    assert!(err.message.starts_with("request timed out"));
    assert!(!err.message.contains(TEST_API_KEY));
}

#[tokio::test]
async fn test_unreachable_upstream_is_network_error() {
    let client = AbstractClient::new(config_for_base(&closed_port_base(), Some(TEST_API_KEY)))
        .expect("client builds");

    let err = client.verify_email("user@example.com").await.unwrap_err();
    assert_eq!(err.classification, ErrorClassification::Network);
    assert!(!err.message.contains(TEST_API_KEY));
}

#[tokio::test]
async fn test_repeated_calls_are_identical() {
    let server = MockServer::start().await;
    let body = r#"{"phone": "14152007986", "valid": true, "format": {"international": "+14152007986", "local": "(415) 200-7986"}, "carrier": "T-Mobile USA, Inc."}"#;
    Mock::given(method("GET"))
        .respond_with(json_response(200, body))
        .expect(2)
        .mount(&server)
        .await;

    let client = client_for(&server, Some(TEST_API_KEY));
    let first = client.validate_phone("14152007986", None).await.unwrap();
    let second = client.validate_phone("14152007986", None).await.unwrap();

    let first = serde_json::to_vec(&first).unwrap();
    let second = serde_json::to_vec(&second).unwrap();
    assert_eq!(first, second);
    assert_eq!(first, serde_json::to_vec(&serde_json::from_str::<Value>(body).unwrap()).unwrap());
}

#[tokio::test]
async fn test_concurrent_calls_do_not_serialize() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(json_response(200, "{}").set_delay(Duration::from_millis(500)))
        .expect(3)
        .mount(&server)
        .await;

    let client = client_for(&server, Some(TEST_API_KEY));
    let started = std::time::Instant::now();
    let (a, b, c) = tokio::join!(
        client.verify_email("a@example.com"),
        client.validate_phone("14152007986", None),
        client.check_email_reputation("c@example.com"),
    );
    assert!(a.is_ok() && b.is_ok() && c.is_ok());
    assert!(started.elapsed() < Duration::from_millis(1400));
}

#[tokio::test]
async fn test_registry_dispatch_over_http() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(EMAIL_PATH))
        .respond_with(json_response(200, r#"{"email": "user@example.com"}"#))
        .expect(1)
        .mount(&server)
        .await;

    let registry = registry_for(&server, Some(TEST_API_KEY));
    let mut arguments = Map::new();
    arguments.insert("email".to_string(), json!("user@example.com"));

    let result = registry.call("verify_email", &arguments).await.unwrap();
    assert_eq!(result.unwrap()["email"], json!("user@example.com"));
}
