//! Outbound HTTP seam
//!
//! Handlers talk to the upstream service only through [`HttpTransport`], which
//! performs exactly one GET per call. [`ReqwestTransport`] is the production
//! implementation; tests substitute their own.

use crate::config::ServiceConfig;
use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use std::fmt;

/// Status code and body of an upstream response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// What went wrong below HTTP
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    Timeout,
    Connect,
    Other,
}

/// A request that never produced a status code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportError {
    pub kind: TransportErrorKind,
    /// Cause description; must not contain the request URL
    pub message: String,
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl std::error::Error for TransportError {}

impl From<reqwest::Error> for TransportError {
    fn from(error: reqwest::Error) -> Self {
        let kind = if error.is_timeout() {
            TransportErrorKind::Timeout
        } else if error.is_connect() {
            TransportErrorKind::Connect
        } else {
            TransportErrorKind::Other
        };

        // The URL carries the API key as a query parameter
        let error = error.without_url();
        let mut message = error.to_string();
        let mut source = std::error::Error::source(&error);
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }

        Self { kind, message }
    }
}

/// Performs a single outbound GET with query parameters
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn get(
        &self,
        url: &str,
        query: &[(&'static str, String)],
    ) -> std::result::Result<RawResponse, TransportError>;
}

/// `reqwest` backed transport with bounded timeouts
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: ReqwestClient,
}

impl ReqwestTransport {
    /// Build a client honoring the configured timeouts and user agent
    pub fn new(config: &ServiceConfig) -> Result<Self> {
        let timeouts = config.timeouts();
        let client = ReqwestClient::builder()
            .connect_timeout(timeouts.connect_timeout)
            .timeout(timeouts.request_timeout)
            .user_agent(config.user_agent())
            .build()
            .map_err(|e| Error::HttpClient {
                message: format!("Failed to create HTTP client: {}", e),
                source: Some(e),
            })?;

        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(
        &self,
        url: &str,
        query: &[(&'static str, String)],
    ) -> std::result::Result<RawResponse, TransportError> {
        let response = self.client.get(url).query(query).send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?;

        Ok(RawResponse {
            status,
            body: body.to_vec(),
        })
    }
}
