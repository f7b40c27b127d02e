//! Error types for the AbstractAPI core library
//!
//! Two layers of errors live in this crate:
//!
//! - [`Error`]: construction-time failures (bad configuration values, an HTTP
//!   client that cannot be built). These happen before any operation runs.
//! - [`ServiceError`](crate::http::ServiceError): the per-call outcome returned
//!   by every operation handler. Those never escalate into an [`Error`].

use thiserror::Error;

/// Main error type for building the adapter
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Invalid endpoint URL override
    #[error("Invalid URL for {endpoint}: {source}")]
    InvalidUrl {
        endpoint: String,
        #[source]
        source: url::ParseError,
    },

    /// HTTP client construction errors
    #[error("HTTP client error: {message}")]
    HttpClient {
        message: String,
        #[source]
        source: Option<reqwest::Error>,
    },
}

/// Convenience type alias for Results using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}
