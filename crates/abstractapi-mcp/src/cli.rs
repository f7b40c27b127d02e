//! Command-line interface argument parsing and definitions
//!
//! This module defines the CLI structure using clap's derive API.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// AbstractAPI MCP - email, phone, and reputation validation tools over stdio
///
/// Runs a tool server on stdin/stdout by default. The `call` and `tools`
/// subcommands invoke the same tools directly for debugging.
#[derive(Parser, Debug)]
#[command(
    name = "abstractapi-mcp",
    version,
    author,
    about,
    long_about = None,
    propagate_version = true
)]
pub struct Cli {
    /// Enable verbose logging (can be used multiple times for increased verbosity)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Path to configuration file (JSON or YAML)
    #[arg(short, long, global = true, env = "ABSTRACTAPI_MCP_CONFIG")]
    pub config: Option<PathBuf>,

    /// API key for the upstream service
    #[arg(long, global = true, env = "ABSTRACT_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Request timeout in seconds for upstream calls
    #[arg(long, global = true, value_parser = clap::value_parser!(u64).range(1..=300))]
    pub timeout: Option<u64>,

    /// Log line format (logs always go to stderr)
    #[arg(long, value_enum, global = true)]
    pub log_format: Option<LogFormatArg>,

    /// Output format for `call` and `tools`
    #[arg(short, long, value_enum, global = true, default_value = "human")]
    pub output: OutputFormat,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// The subcommand to run (defaults to `serve`)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve the validation tools over stdin/stdout
    Serve,

    /// Invoke a single tool and print its result
    Call(CallArgs),

    /// List the available tools and their input schemas
    Tools,

    /// Generate shell completions for the specified shell
    Completions(CompletionsArgs),
}

/// Arguments for the call command
#[derive(Parser, Debug)]
pub struct CallArgs {
    /// Tool name (verify_email, validate_phone, check_email_reputation)
    #[arg(value_name = "TOOL")]
    pub tool: String,

    /// Tool arguments as a JSON object, e.g. '{"email": "user@example.com"}'
    #[arg(value_name = "ARGS_JSON")]
    pub arguments: Option<String>,
}

/// Arguments for generating shell completions
#[derive(Parser, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Output format options
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable formatted output
    Human,
    /// JSON output
    Json,
    /// Pretty-printed JSON output
    JsonPretty,
}

/// Log format options
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogFormatArg {
    Compact,
    Full,
    Json,
}

/// Supported shells for completion generation
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the effective verbosity level (considering quiet flag)
    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }

    /// Check if colored output should be used
    pub fn use_color(&self) -> bool {
        use std::io::IsTerminal;
        !self.no_color && std::io::stdout().is_terminal()
    }
}

impl Shell {
    /// Convert to clap_complete shell type
    pub fn to_clap_shell(self) -> clap_complete::Shell {
        match self {
            Shell::Bash => clap_complete::Shell::Bash,
            Shell::Zsh => clap_complete::Shell::Zsh,
            Shell::Fish => clap_complete::Shell::Fish,
            Shell::PowerShell => clap_complete::Shell::PowerShell,
            Shell::Elvish => clap_complete::Shell::Elvish,
        }
    }
}
