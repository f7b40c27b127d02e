//! Subcommand handlers

use crate::cli::{CallArgs, CompletionsArgs};
use crate::error::{Error, Result};
use crate::logging::timing::Timer;
use crate::mcp::McpServer;
use crate::output::OutputWriter;
use abstractapi_core::http::json_type_name;
use abstractapi_core::ToolRegistry;
use clap::CommandFactory;
use serde_json::{Map, Value};
use tokio::io::BufReader;

/// Serve the registry over stdin/stdout until stdin closes
pub async fn handle_serve(registry: ToolRegistry) -> Result<()> {
    let server = McpServer::new(registry);
    tracing::debug!(tools = ?server.registry().names(), "Starting stdio server");
    server
        .run(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
        .await
}

/// Invoke one tool and print the outcome
pub async fn handle_call(
    args: CallArgs,
    registry: &ToolRegistry,
    output: &mut OutputWriter,
) -> Result<()> {
    let arguments = parse_arguments(args.arguments.as_deref())?;
    let timer = Timer::with_details("call", &args.tool);

    let outcome = registry.call(&args.tool, &arguments).await?;
    tracing::info!(
        tool = %args.tool,
        ok = outcome.is_ok(),
        duration_ms = timer.elapsed().as_millis() as u64,
        "Call finished"
    );

    match outcome {
        Ok(mapping) => output.tool_result(&args.tool, &mapping),
        Err(err) => {
            output.tool_error(&err)?;
            Err(Error::Tool(err))
        }
    }
}

/// List the registered tools
pub fn handle_tools(registry: &ToolRegistry, output: &mut OutputWriter) -> Result<()> {
    output.tools(&registry.descriptors())
}

/// Handle the completions command
pub fn handle_completions(args: &CompletionsArgs) -> Result<()> {
    let mut cmd = crate::cli::Cli::command();
    let name = cmd.get_name().to_string();

    clap_complete::generate(
        args.shell.to_clap_shell(),
        &mut cmd,
        name,
        &mut std::io::stdout(),
    );

    Ok(())
}

/// Decode the optional `ARGS_JSON` positional into an argument object
fn parse_arguments(raw: Option<&str>) -> Result<Map<String, Value>> {
    let Some(raw) = raw.filter(|r| !r.trim().is_empty()) else {
        return Ok(Map::new());
    };
    match serde_json::from_str::<Value>(raw)? {
        Value::Object(map) => Ok(map),
        other => Err(Error::other(format!(
            "tool arguments must be a JSON object, got {}",
            json_type_name(&other)
        ))),
    }
}
