//! AbstractAPI Core - request/response adapter for remote validation services
//!
//! This crate exposes three upstream capabilities as callable operations:
//! email verification, phone validation, and email reputation analysis. Each
//! call is a single best-effort GET; the upstream answer is passed through
//! unchanged or classified into a small, stable set of failure kinds.
//!
//! # Main Components
//!
//! - **Configuration**: an immutable [`ServiceConfig`] holding the API key,
//!   endpoints, and timeouts
//! - **HTTP layer**: transport seam, request shaping, error classification,
//!   and response normalization
//! - **Operations**: the three handlers on [`AbstractClient`]
//! - **Registry**: an explicit name-to-tool lookup table for dispatch
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use abstractapi_core::{AbstractClient, ServiceConfig};
//!
//! # async fn example() -> abstractapi_core::Result<()> {
//! let config = Arc::new(ServiceConfig::from_env()?);
//! let client = AbstractClient::new(config)?;
//!
//! match client.verify_email("user@example.com").await {
//!     Ok(report) => println!("{}", serde_json::Value::Object(report)),
//!     Err(error) => eprintln!("{} ({})", error.message, error.classification),
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod http;
pub mod operations;
pub mod redaction;
pub mod registry;

pub use config::{ApiKey, Endpoints, ServiceConfig, ServiceConfigBuilder, TimeoutConfig};
pub use error::{Error, Result};
pub use http::{
    ErrorClassification, HttpTransport, RawResponse, ReqwestTransport, ServiceError,
    TransportError, TransportErrorKind,
};
pub use operations::{AbstractClient, Operation, OperationResult, ValidationRequest};
pub use registry::{RegistryError, Tool, ToolDescriptor, ToolRegistry};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
