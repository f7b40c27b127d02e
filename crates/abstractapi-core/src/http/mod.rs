//! HTTP layer for upstream API communication
//!
//! This module provides:
//! - A single-GET transport seam with a `reqwest` implementation
//! - Request construction with query-parameter authentication
//! - Error classification into caller-visible outcomes
//! - Pass-through response normalization

pub mod error;
pub mod normalizer;
pub mod request;
pub mod transport;

pub use error::{ErrorClassification, ServiceError};
pub use normalizer::{json_type_name, normalize_response};
pub use request::{UpstreamRequest, UpstreamRequestBuilder, API_KEY_PARAM};
pub use transport::{HttpTransport, RawResponse, ReqwestTransport, TransportError, TransportErrorKind};
