//! Operation handlers
//!
//! Each handler validates its inputs, checks that a key is configured, shapes
//! one upstream GET, and routes the answer through the normalizer or the
//! classifier. There is no retry, caching, or shared mutable state: the only
//! suspension point is the transport call.

mod email;
mod phone;
mod reputation;

pub use email::{EmailArgs, VerifyEmailTool};
pub use phone::{PhoneArgs, ValidatePhoneTool};
pub use reputation::CheckEmailReputationTool;

use crate::config::{ApiKey, Endpoints, ServiceConfig};
use crate::error::Result;
use crate::http::{
    normalize_response, HttpTransport, ReqwestTransport, ServiceError, UpstreamRequest,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

/// Outcome of one operation: the upstream mapping or a classified failure
pub type OperationResult = std::result::Result<Map<String, Value>, ServiceError>;

/// The three caller-facing operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    VerifyEmail,
    ValidatePhone,
    CheckEmailReputation,
}

impl Operation {
    pub const ALL: [Operation; 3] = [
        Operation::VerifyEmail,
        Operation::ValidatePhone,
        Operation::CheckEmailReputation,
    ];

    /// Stable dispatch name
    pub fn name(&self) -> &'static str {
        match self {
            Operation::VerifyEmail => "verify_email",
            Operation::ValidatePhone => "validate_phone",
            Operation::CheckEmailReputation => "check_email_reputation",
        }
    }

    /// Base URL this operation talks to
    pub fn endpoint<'a>(&self, endpoints: &'a Endpoints) -> &'a str {
        match self {
            Operation::VerifyEmail => &endpoints.email_validation,
            Operation::ValidatePhone => &endpoints.phone_validation,
            Operation::CheckEmailReputation => &endpoints.email_reputation,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Inputs of a single call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationRequest {
    VerifyEmail { email: String },
    ValidatePhone { phone: String, country: Option<String> },
    CheckEmailReputation { email: String },
}

impl ValidationRequest {
    pub fn operation(&self) -> Operation {
        match self {
            ValidationRequest::VerifyEmail { .. } => Operation::VerifyEmail,
            ValidationRequest::ValidatePhone { .. } => Operation::ValidatePhone,
            ValidationRequest::CheckEmailReputation { .. } => Operation::CheckEmailReputation,
        }
    }

    /// The primary identifier must be non-empty.
    ///
    /// No format checks: the upstream service is authoritative on validity.
    pub fn validate(&self) -> std::result::Result<(), ServiceError> {
        let (field, value) = match self {
            ValidationRequest::VerifyEmail { email }
            | ValidationRequest::CheckEmailReputation { email } => ("email", email),
            ValidationRequest::ValidatePhone { phone, .. } => ("phone", phone),
        };
        if value.trim().is_empty() {
            return Err(ServiceError::invalid_argument(field, "must be a non-empty string"));
        }
        Ok(())
    }

    fn to_upstream(&self, url: &str, api_key: &ApiKey) -> UpstreamRequest {
        let builder = UpstreamRequest::builder(self.operation(), url, api_key);
        let builder = match self {
            ValidationRequest::VerifyEmail { email }
            | ValidationRequest::CheckEmailReputation { email } => {
                builder.param("email", email.as_str())
            }
            ValidationRequest::ValidatePhone { phone, country } => builder
                .param("phone", phone.as_str())
                .optional_param("country", country.as_deref()),
        };
        builder.build()
    }
}

/// Adapter over the upstream validation service
#[derive(Clone)]
pub struct AbstractClient {
    config: Arc<ServiceConfig>,
    transport: Arc<dyn HttpTransport>,
}

impl AbstractClient {
    /// Create a client with the production `reqwest` transport
    pub fn new(config: Arc<ServiceConfig>) -> Result<Self> {
        let transport = ReqwestTransport::new(&config)?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Create a client with a caller-supplied transport
    pub fn with_transport(config: Arc<ServiceConfig>, transport: Arc<dyn HttpTransport>) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Run one operation end to end.
    ///
    /// Arguments are checked before the key, so a keyless call with an empty
    /// argument reports `InvalidArgumentError`, not `ConfigurationError`.
    /// Neither failure reaches the transport.
    #[instrument(skip_all, fields(operation = %request.operation()))]
    pub async fn execute(&self, request: ValidationRequest) -> OperationResult {
        request.validate()?;

        let Some(api_key) = self.config.api_key() else {
            warn!("API key not configured; skipping upstream call");
            return Err(ServiceError::missing_api_key());
        };

        let operation = request.operation();
        let url = operation.endpoint(self.config.endpoints());
        let upstream = request.to_upstream(url, api_key);
        let secret = Some(api_key.expose());

        debug!(
            endpoint = url,
            params = ?upstream.param_names(),
            "Sending upstream request"
        );

        let started = Instant::now();
        let response = match self.transport.get(upstream.url(), upstream.query()).await {
            Ok(response) => response,
            Err(transport_error) => {
                let error = ServiceError::from_transport(&transport_error, secret);
                warn!(
                    kind = %error.classification,
                    duration_ms = started.elapsed().as_millis() as u64,
                    error = %error.message,
                    "Upstream request failed"
                );
                return Err(error);
            }
        };
        let duration_ms = started.elapsed().as_millis() as u64;

        let result = if response.is_success() {
            normalize_response(&response.body)
        } else {
            Err(ServiceError::from_status(response.status, &response.body, secret))
        };

        match &result {
            Ok(payload) => info!(
                status = response.status,
                duration_ms,
                fields = payload.len(),
                "Upstream request succeeded"
            ),
            Err(error) => warn!(
                status = response.status,
                duration_ms,
                kind = %error.classification,
                error = %error.message,
                "Upstream request returned an error"
            ),
        }

        result
    }
}

impl fmt::Debug for AbstractClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AbstractClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Decode a tool argument map into a typed argument struct
pub(crate) fn decode_arguments<T: serde::de::DeserializeOwned>(
    arguments: &Map<String, Value>,
) -> std::result::Result<T, ServiceError> {
    serde_json::from_value(Value::Object(arguments.clone())).map_err(|e| {
        ServiceError::new(
            crate::http::ErrorClassification::InvalidArgument,
            format!("invalid arguments: {}", e),
        )
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::http::{ErrorClassification, RawResponse, TransportError, TransportErrorKind};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Transport double that records calls and replays one canned answer
    pub(crate) struct ScriptedTransport {
        answer: std::result::Result<RawResponse, TransportError>,
        calls: AtomicUsize,
        last_query: Mutex<Vec<(&'static str, String)>>,
        last_url: Mutex<String>,
    }

    impl ScriptedTransport {
        pub(crate) fn responding(status: u16, body: &str) -> Arc<Self> {
            Arc::new(Self {
                answer: Ok(RawResponse::new(status, body)),
                calls: AtomicUsize::new(0),
                last_query: Mutex::new(Vec::new()),
                last_url: Mutex::new(String::new()),
            })
        }

        pub(crate) fn failing(kind: TransportErrorKind, message: &str) -> Arc<Self> {
            Arc::new(Self {
                answer: Err(TransportError {
                    kind,
                    message: message.to_string(),
                }),
                calls: AtomicUsize::new(0),
                last_query: Mutex::new(Vec::new()),
                last_url: Mutex::new(String::new()),
            })
        }

        pub(crate) fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        pub(crate) fn last_query(&self) -> Vec<(&'static str, String)> {
            self.last_query.lock().unwrap().clone()
        }

        pub(crate) fn last_url(&self) -> String {
            self.last_url.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl HttpTransport for ScriptedTransport {
        async fn get(
            &self,
            url: &str,
            query: &[(&'static str, String)],
        ) -> std::result::Result<RawResponse, TransportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_url.lock().unwrap() = url.to_string();
            *self.last_query.lock().unwrap() = query.to_vec();
            self.answer.clone()
        }
    }

    pub(crate) fn client_with(
        transport: Arc<ScriptedTransport>,
        api_key: Option<&str>,
    ) -> AbstractClient {
        let mut builder = ServiceConfig::builder();
        if let Some(key) = api_key {
            builder = builder.api_key(key);
        }
        AbstractClient::with_transport(Arc::new(builder.build().unwrap()), transport)
    }

    #[test]
    fn test_operation_names() {
        let names: Vec<&str> = Operation::ALL.iter().map(Operation::name).collect();
        assert_eq!(
            names,
            vec!["verify_email", "validate_phone", "check_email_reputation"]
        );
        assert_eq!(
            serde_json::to_value(Operation::CheckEmailReputation).unwrap(),
            "check_email_reputation"
        );
    }

    #[test]
    fn test_operation_endpoints() {
        let endpoints = Endpoints::default();
        assert!(Operation::VerifyEmail
            .endpoint(&endpoints)
            .starts_with("https://emailvalidation."));
        assert!(Operation::ValidatePhone
            .endpoint(&endpoints)
            .starts_with("https://phonevalidation."));
        assert!(Operation::CheckEmailReputation
            .endpoint(&endpoints)
            .starts_with("https://emailreputation."));
    }

    #[test]
    fn test_request_validation() {
        let ok = ValidationRequest::VerifyEmail {
            email: "not-an-email".to_string(),
        };
        assert!(ok.validate().is_ok());

        let empty = ValidationRequest::ValidatePhone {
            phone: "  ".to_string(),
            country: Some("US".to_string()),
        };
        let err = empty.validate().unwrap_err();
        assert_eq!(err.classification, ErrorClassification::InvalidArgument);
        assert!(err.message.contains("'phone'"));
    }

    #[tokio::test]
    async fn test_missing_key_makes_no_call() {
        let transport = ScriptedTransport::responding(200, "{}");
        let client = client_with(transport.clone(), None);

        let requests = [
            ValidationRequest::VerifyEmail {
                email: "user@example.com".to_string(),
            },
            ValidationRequest::ValidatePhone {
                phone: "14152007986".to_string(),
                country: None,
            },
            ValidationRequest::CheckEmailReputation {
                email: "user@example.com".to_string(),
            },
        ];
        for request in requests {
            let err = client.execute(request).await.unwrap_err();
            assert_eq!(err.classification, ErrorClassification::Configuration);
            assert_eq!(err.message, "API key not configured");
        }
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_empty_identifier_makes_no_call() {
        let transport = ScriptedTransport::responding(200, "{}");
        let client = client_with(transport.clone(), Some("key"));

        let err = client
            .execute(ValidationRequest::VerifyEmail {
                email: String::new(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.classification, ErrorClassification::InvalidArgument);
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_empty_identifier_without_key_is_invalid_argument() {
        let transport = ScriptedTransport::responding(200, "{}");
        let client = client_with(transport.clone(), None);

        let err = client
            .execute(ValidationRequest::ValidatePhone {
                phone: "  ".to_string(),
                country: None,
            })
            .await
            .unwrap_err();
        assert_eq!(err.classification, ErrorClassification::InvalidArgument);
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_success_is_single_call_pass_through() {
        let body = r#"{"email": "user@example.com", "deliverability": "DELIVERABLE", "is_valid_format": {"value": true, "text": "TRUE"}}"#;
        let transport = ScriptedTransport::responding(200, body);
        let client = client_with(transport.clone(), Some("key"));

        let result = client
            .execute(ValidationRequest::VerifyEmail {
                email: "user@example.com".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(transport.calls(), 1);
        assert_eq!(
            Value::Object(result),
            serde_json::from_str::<Value>(body).unwrap()
        );
        assert_eq!(
            transport.last_query(),
            vec![
                ("api_key", "key".to_string()),
                ("email", "user@example.com".to_string())
            ]
        );
        assert_eq!(transport.last_url(), Endpoints::default().email_validation);
    }

    #[tokio::test]
    async fn test_error_status_is_classified_once() {
        let transport = ScriptedTransport::responding(429, r#"{"error": {"message": "slow down"}}"#);
        let client = client_with(transport.clone(), Some("key"));

        let err = client
            .execute(ValidationRequest::CheckEmailReputation {
                email: "user@example.com".to_string(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.classification, ErrorClassification::RateLimit);
        assert_eq!(err.status_code, Some(429));
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn test_transport_failure_is_network_error() {
        let transport = ScriptedTransport::failing(
            TransportErrorKind::Timeout,
            "operation timed out for api_key=sekrit",
        );
        let client = client_with(transport.clone(), Some("sekrit"));

        let err = client
            .execute(ValidationRequest::VerifyEmail {
                email: "user@example.com".to_string(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.classification, ErrorClassification::Network);
        assert!(err.message.starts_with("request timed out"));
        assert!(!err.message.contains("sekrit"));
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn test_malformed_success_body() {
        let transport = ScriptedTransport::responding(200, "[1, 2, 3]");
        let client = client_with(transport, Some("key"));

        let err = client
            .execute(ValidationRequest::VerifyEmail {
                email: "user@example.com".to_string(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.classification, ErrorClassification::MalformedResponse);
    }

    #[test]
    fn test_client_debug_hides_key() {
        let client = client_with(ScriptedTransport::responding(200, "{}"), Some("hidden-key"));
        assert!(!format!("{:?}", client).contains("hidden-key"));
    }
}
