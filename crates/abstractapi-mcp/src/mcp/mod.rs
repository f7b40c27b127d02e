//! Minimal Model Context Protocol over stdio
//!
//! Only the JSON-RPC 2.0 subset needed to list and call tools is implemented:
//! newline-delimited messages in, newline-delimited responses out.

mod server;

pub use server::McpServer;

use abstractapi_core::{OperationResult, ServiceError};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

pub const JSONRPC_VERSION: &str = "2.0";

/// Protocol revision assumed when the client asks for one we do not know
pub const DEFAULT_PROTOCOL_VERSION: &str = "2025-06-18";

/// Revisions the server will echo back to a client that requests them
pub const SUPPORTED_PROTOCOL_VERSIONS: [&str; 3] = ["2025-06-18", "2025-03-26", "2024-11-05"];

/// Name reported in `serverInfo`
pub const SERVER_NAME: &str = "abstract_api";

/// Standard JSON-RPC error codes
pub mod codes {
    pub const PARSE_ERROR: i64 = -32700;
    pub const INVALID_REQUEST: i64 = -32600;
    pub const METHOD_NOT_FOUND: i64 = -32601;
    pub const INVALID_PARAMS: i64 = -32602;
}

/// Incoming message; a missing `id` marks a notification
#[derive(Debug, Clone, Deserialize)]
pub struct Request {
    #[serde(default)]
    pub jsonrpc: Option<String>,
    #[serde(default)]
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Option<Value>,
}

impl Request {
    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

/// Outgoing response, carrying exactly one of `result` or `error`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub jsonrpc: String,
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

impl Response {
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(id: Value, error: RpcError) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: None,
            error: Some(error),
        }
    }
}

/// JSON-RPC error object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl RpcError {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    pub fn parse_error(detail: impl std::fmt::Display) -> Self {
        Self::new(codes::PARSE_ERROR, format!("Parse error: {}", detail))
    }

    pub fn invalid_request(detail: impl std::fmt::Display) -> Self {
        Self::new(codes::INVALID_REQUEST, format!("Invalid request: {}", detail))
    }

    pub fn method_not_found(method: &str) -> Self {
        Self::new(codes::METHOD_NOT_FOUND, format!("Method not found: {}", method))
    }

    pub fn invalid_params(detail: impl std::fmt::Display) -> Self {
        Self::new(codes::INVALID_PARAMS, format!("Invalid params: {}", detail))
    }
}

/// Parameters of `tools/call`
#[derive(Debug, Clone, Deserialize)]
pub struct CallToolParams {
    pub name: String,
    #[serde(default)]
    pub arguments: Option<Map<String, Value>>,
}

/// Render an operation outcome as a `tools/call` result.
///
/// Failures stay in-band with `isError: true` so the calling model sees the
/// classified kind instead of a transport-level error.
pub fn tool_result(outcome: &OperationResult) -> Value {
    match outcome {
        Ok(mapping) => json!({
            "content": [{
                "type": "text",
                "text": Value::Object(mapping.clone()).to_string(),
            }],
            "structuredContent": mapping,
            "isError": false,
        }),
        Err(err) => tool_error(err),
    }
}

fn tool_error(err: &ServiceError) -> Value {
    json!({
        "content": [{"type": "text", "text": err.to_string()}],
        "structuredContent": {"error": err},
        "isError": true,
    })
}
