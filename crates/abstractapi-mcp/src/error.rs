//! Error types and handling for the CLI
//!
//! Every failure that ends the process maps to one variant here, and each
//! variant carries a distinct exit code.

use abstractapi_core::{RegistryError, ServiceError};
use std::io;
use std::path::PathBuf;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for CLI operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error (stdio, config files)
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Error from the core library (invalid configuration, client setup)
    #[error("Core error: {0}")]
    Core(#[from] abstractapi_core::Error),

    /// Explicitly requested config file is missing
    #[error("File not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// A tool invocation returned a classified failure
    #[error("{0}")]
    Tool(#[from] ServiceError),

    /// Tool name not in the registry
    #[error("Unknown tool '{}'. Run `abstractapi-mcp tools` to list available tools", name)]
    UnknownTool { name: String },

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Generic error with context
    #[error("{message}")]
    Other { message: String },
}

impl Error {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a generic error with message
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Io(_) => 1,
            Self::Core(_) => 2,
            Self::FileNotFound { .. } => 3,
            Self::Config(_) => 5,
            Self::Tool(_) => 6,
            Self::UnknownTool { .. } => 7,
            Self::Json(_) => 12,
            Self::Yaml(_) => 13,
            Self::Other { .. } => 99,
        }
    }

    /// Check if this error should display usage help
    pub fn should_show_help(&self) -> bool {
        matches!(self, Self::UnknownTool { .. } | Self::Json(_))
    }
}

impl From<RegistryError> for Error {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::NotFound { name } => Self::UnknownTool { name },
            other => Self::other(other.to_string()),
        }
    }
}

/// Format an error for display to the user
pub fn format_error(error: &Error, use_color: bool) -> String {
    if use_color {
        use colored::Colorize;
        format!("{} {}", "Error:".red().bold(), error)
    } else {
        format!("Error: {}", error)
    }
}
