//! Response normalization for upstream API responses
//!
//! The upstream service already returns rich nested JSON, so normalization is a
//! pass-through: the top level must be an object, and nothing is renamed,
//! filtered, or added.

use crate::http::error::ServiceError;
use serde_json::{Map, Value};

/// Parse a 2xx body into the caller-facing mapping
pub fn normalize_response(body: &[u8]) -> Result<Map<String, Value>, ServiceError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(ServiceError::malformed("empty body"));
    }

    let value: Value = serde_json::from_slice(body)
        .map_err(|e| ServiceError::malformed(format!("invalid JSON ({})", e)))?;

    match value {
        Value::Object(map) => Ok(map),
        other => Err(ServiceError::malformed(format!(
            "expected a JSON object, got {}",
            json_type_name(&other)
        ))),
    }
}

/// Article-prefixed JSON type name for error messages, e.g. "an array"
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
