//! abstractapi-mcp - email, phone, and reputation validation tools over stdio
//!
//! By default the binary serves the tools to an MCP client on stdin/stdout.
//! The `call` and `tools` subcommands reach the same registry from a shell.

mod cli;
mod config;
mod error;
mod handlers;
mod logging;
mod mcp;
mod output;

use abstractapi_core::{AbstractClient, ToolRegistry};
use cli::{Cli, Commands};
use colored::control;
use config::{CliOverrides, Config};
use error::Result;
use logging::{timing::Timer, LoggingConfig};
use output::OutputWriter;
use std::process;
use std::sync::Arc;
use tracing::instrument;

#[tokio::main]
async fn main() {
    // A .env file feeds both clap's env fallbacks and the core's env lookup
    dotenv::dotenv().ok();

    let cli = Cli::parse_args();

    control::set_override(cli.use_color());

    // Completions need neither configuration nor logging
    if let Some(Commands::Completions(args)) = &cli.command {
        exit_with(handlers::handle_completions(args));
    }

    let result = match Config::load_with_file(cli.config.as_deref()) {
        Ok(config) => {
            if let Err(e) = init_logging(&cli, &config) {
                eprintln!("Failed to initialize logging: {}", e);
            }
            for warning in &config.load_warnings {
                tracing::warn!("{}", warning);
            }
            run(cli, config).await
        }
        Err(e) => Err(e),
    };

    exit_with(result);
}

fn exit_with(result: Result<()>) -> ! {
    match result {
        Ok(()) => process::exit(0),
        Err(e) => {
            eprintln!(
                "{}",
                error::format_error(&e, control::SHOULD_COLORIZE.should_colorize())
            );

            if e.should_show_help() {
                eprintln!("\nFor more information, try '--help'");
            }

            process::exit(e.exit_code());
        }
    }
}

/// Main application logic
#[instrument(skip_all, fields(command = ?cli.command))]
async fn run(cli: Cli, config: Config) -> Result<()> {
    let _timer = Timer::new("cli_execution");

    let overrides = CliOverrides {
        api_key: cli.api_key.clone(),
        timeout_secs: cli.timeout,
    };
    let service_config = Arc::new(config.to_service_config(&overrides)?);
    if !service_config.has_api_key() {
        tracing::warn!("No API key configured; every tool call will fail until one is set");
    }

    let client = AbstractClient::new(service_config)?;
    let registry = ToolRegistry::with_default_tools(client);

    tracing::info!(
        verbosity = cli.verbosity_level(),
        tools = registry.len(),
        "Executing command"
    );

    let mut output = OutputWriter::new(cli.output, cli.use_color());
    match cli.command {
        None | Some(Commands::Serve) => handlers::handle_serve(registry).await,
        Some(Commands::Call(args)) => handlers::handle_call(args, &registry, &mut output).await,
        Some(Commands::Tools) => handlers::handle_tools(&registry, &mut output),
        Some(Commands::Completions(args)) => handlers::handle_completions(&args),
    }
}

/// Initialize the logging system
fn init_logging(cli: &Cli, config: &Config) -> Result<()> {
    let mut logging_config = LoggingConfig::from_verbosity(cli.verbosity_level());
    logging_config.merge_with_file(&config.logging, cli.verbosity_level());
    logging_config.merge_with_env();

    if let Some(format) = cli.log_format {
        logging_config.format = match format {
            cli::LogFormatArg::Compact => logging::LogFormat::Compact,
            cli::LogFormatArg::Full => logging::LogFormat::Full,
            cli::LogFormatArg::Json => logging::LogFormat::Json,
        };
    }

    if cli.quiet {
        logging_config.level = "error".to_string();
    }
    if cli.no_color {
        logging_config.ansi = false;
    }

    logging::init_logging(logging_config)
}
