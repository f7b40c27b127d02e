use super::{
    codes, tool_result, CallToolParams, Request, Response, RpcError, DEFAULT_PROTOCOL_VERSION,
    JSONRPC_VERSION, SERVER_NAME, SUPPORTED_PROTOCOL_VERSIONS,
};
use crate::error::Result;
use crate::logging::{redaction, timing::Timer};
use abstractapi_core::{RegistryError, ToolRegistry};
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, info, trace, warn};

/// Stdio tool server dispatching into a [`ToolRegistry`]
#[derive(Debug, Clone)]
pub struct McpServer {
    registry: Arc<ToolRegistry>,
}

impl McpServer {
    pub fn new(registry: ToolRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Serve until `reader` reaches EOF.
    ///
    /// Tool calls run on their own tasks; every response goes through a
    /// single writer task so lines never interleave. Calls still in flight
    /// at EOF are awaited before returning.
    pub async fn run<R, W>(&self, mut reader: R, writer: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel::<Response>();
        let writer_task = tokio::spawn(write_responses(rx, writer));
        let mut in_flight = JoinSet::new();
        let mut buf = Vec::new();

        info!(tools = self.registry.len(), "Serving tools over stdio");

        // Raw bytes so a line that is not UTF-8 becomes a parse error, not EOF
        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf).await? == 0 {
                break;
            }
            let line = buf.trim_ascii();
            if line.is_empty() {
                continue;
            }

            let request = match parse_request(line) {
                Ok(Some(request)) => request,
                Ok(None) => continue,
                Err(response) => {
                    let _ = tx.send(response);
                    continue;
                }
            };

            if request.method == "tools/call" {
                let server = self.clone();
                let tx = tx.clone();
                in_flight.spawn(async move {
                    if let Some(response) = server.handle_request(request).await {
                        let _ = tx.send(response);
                    }
                });
            } else if let Some(response) = self.handle_request(request).await {
                let _ = tx.send(response);
            }

            // Reap finished calls so the set does not grow without bound
            while let Some(joined) = in_flight.try_join_next() {
                if let Err(e) = joined {
                    warn!(error = %e, "Tool call task failed");
                }
            }
        }

        debug!(pending = in_flight.len(), "Input closed, draining in-flight calls");
        while let Some(joined) = in_flight.join_next().await {
            if let Err(e) = joined {
                warn!(error = %e, "Tool call task failed");
            }
        }

        drop(tx);
        match writer_task.await {
            Ok(result) => result?,
            Err(e) => warn!(error = %e, "Writer task failed"),
        }

        info!("Input closed, server stopped");
        Ok(())
    }

    /// Parse and answer a single line; `None` for notifications
    #[cfg(test)]
    pub async fn handle_line(&self, line: &str) -> Option<Response> {
        match parse_request(line.as_bytes()) {
            Ok(Some(request)) => self.handle_request(request).await,
            Ok(None) => None,
            Err(response) => Some(response),
        }
    }

    /// Answer a decoded request; `None` for notifications
    pub async fn handle_request(&self, request: Request) -> Option<Response> {
        let Some(id) = request.id.clone() else {
            debug!(method = %request.method, "Notification received");
            return None;
        };

        trace!(method = %request.method, id = %id, "Request received");

        let outcome = match request.method.as_str() {
            "initialize" => Ok(self.initialize(request.params.as_ref())),
            "ping" => Ok(json!({})),
            "tools/list" => Ok(json!({ "tools": self.registry.descriptors() })),
            "tools/call" => self.call_tool(request.params).await,
            other => {
                debug!(method = %other, "Unknown method");
                Err(RpcError::method_not_found(other))
            }
        };

        Some(match outcome {
            Ok(result) => Response::success(id, result),
            Err(error) => Response::failure(id, error),
        })
    }

    fn initialize(&self, params: Option<&Value>) -> Value {
        let requested = params
            .and_then(|p| p.get("protocolVersion"))
            .and_then(Value::as_str);
        let version = match requested {
            Some(v) if SUPPORTED_PROTOCOL_VERSIONS.contains(&v) => v,
            _ => DEFAULT_PROTOCOL_VERSION,
        };

        info!(protocol_version = %version, "Client initialized");

        json!({
            "protocolVersion": version,
            "capabilities": { "tools": {} },
            "serverInfo": {
                "name": SERVER_NAME,
                "version": abstractapi_core::VERSION,
            },
        })
    }

    async fn call_tool(&self, params: Option<Value>) -> std::result::Result<Value, RpcError> {
        let params: CallToolParams = params
            .ok_or_else(|| RpcError::invalid_params("missing params"))
            .and_then(|p| serde_json::from_value(p).map_err(RpcError::invalid_params))?;
        let arguments = params.arguments.unwrap_or_else(Map::new);

        let logged = redaction::redacted(&Value::Object(arguments.clone()));
        trace!(tool = %params.name, arguments = %logged, "Calling tool");
        let _timer = Timer::with_details("tool_call", &params.name);

        match self.registry.call(&params.name, &arguments).await {
            Ok(outcome) => {
                match &outcome {
                    Ok(_) => debug!(tool = %params.name, "Tool call succeeded"),
                    Err(e) => info!(
                        tool = %params.name,
                        kind = %e.classification,
                        "Tool call returned an error"
                    ),
                }
                Ok(tool_result(&outcome))
            }
            Err(RegistryError::NotFound { name }) => {
                Err(RpcError::invalid_params(format!("unknown tool '{}'", name)))
            }
            Err(other) => Err(RpcError::invalid_params(other)),
        }
    }
}

/// Decode one line.
///
/// `Ok(None)` means the line was a notification-shaped message that cannot
/// be answered; `Err` carries the error response to send back.
fn parse_request(line: &[u8]) -> std::result::Result<Option<Request>, Response> {
    let value: Value = serde_json::from_slice(line).map_err(|e| {
        debug!(error = %e, "Unparseable message");
        Response::failure(Value::Null, RpcError::parse_error(e))
    })?;

    let id = value.get("id").cloned().unwrap_or(Value::Null);
    let request: Request = match serde_json::from_value(value) {
        Ok(request) => request,
        Err(e) if id.is_null() => {
            debug!(error = %e, "Dropping malformed notification");
            return Ok(None);
        }
        Err(e) => return Err(Response::failure(id, RpcError::invalid_request(e))),
    };

    if let Some(version) = request.jsonrpc.as_deref() {
        if version != JSONRPC_VERSION {
            let error = RpcError::new(
                codes::INVALID_REQUEST,
                format!("Invalid request: unsupported jsonrpc version '{}'", version),
            );
            return match request.id {
                Some(id) => Err(Response::failure(id, error)),
                None => Ok(None),
            };
        }
    }

    Ok(Some(request))
}

async fn write_responses<W>(mut rx: mpsc::UnboundedReceiver<Response>, mut writer: W) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(response) = rx.recv().await {
        let mut line = serde_json::to_vec(&response)?;
        line.push(b'\n');
        writer.write_all(&line).await?;
        writer.flush().await?;
    }
    Ok(())
}
