//! Logging setup for the server and CLI
//!
//! This module provides:
//! - Session ID generation
//! - Redaction of credentials in logged payloads
//! - Performance timing spans
//! - Structured logging setup (compact, full, JSON), always on stderr
//!
//! Stdout carries protocol messages in `serve` mode, so nothing in here
//! may ever write to it.

use crate::error::{Error, Result};
use std::io::IsTerminal;
use std::str::FromStr;
use std::sync::OnceLock;
use tracing::{field, Span};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

/// Environment variable selecting the log format
pub const LOG_FORMAT_ENV: &str = "ABSTRACTAPI_MCP_LOG_FORMAT";

/// Session ID for the current process
static SESSION_ID: OnceLock<String> = OnceLock::new();

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Log level filter
    pub level: String,
    /// Output format: compact, full, json
    pub format: LogFormat,
    /// Allow ANSI colors when stderr is a terminal
    pub ansi: bool,
    /// Include thread IDs
    pub thread_ids: bool,
    /// Include file and line numbers
    pub source_location: bool,
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Compact format for production
    Compact,
    /// Full format with all details
    Full,
    /// JSON structured format
    Json,
}

impl FromStr for LogFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "compact" => Ok(LogFormat::Compact),
            "full" => Ok(LogFormat::Full),
            "json" => Ok(LogFormat::Json),
            other => Err(Error::config(format!(
                "invalid log format '{}', expected compact, full, or json",
                other
            ))),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: LogFormat::Compact,
            ansi: true,
            thread_ids: false,
            source_location: false,
        }
    }
}

impl LoggingConfig {
    /// Create logging config from verbosity level
    pub fn from_verbosity(verbosity: u8) -> Self {
        let mut config = Self::default();

        match verbosity {
            0 => {}
            1 => {
                config.level = "info".to_string();
            }
            2 => {
                config.level = "debug".to_string();
                config.source_location = true;
            }
            _ => {
                config.level = "trace".to_string();
                config.format = LogFormat::Full;
                config.source_location = true;
                config.thread_ids = true;
            }
        }

        config
    }

    /// Apply the `logging` section of a config file.
    ///
    /// A level from the file only applies when no `-v` flag was given.
    pub fn merge_with_file(&mut self, section: &crate::config::LoggingSection, verbosity: u8) {
        if verbosity == 0 {
            if let Some(level) = &section.level {
                self.level = level.clone();
            }
        }
        if let Some(format) = section.format.as_deref().and_then(|f| f.parse().ok()) {
            self.format = format;
        }
    }

    /// Apply environment overrides
    pub fn merge_with_env(&mut self) {
        // RUST_LOG takes precedence
        if let Ok(rust_log) = std::env::var("RUST_LOG") {
            if !rust_log.trim().is_empty() {
                self.level = rust_log;
            }
        }

        if let Ok(format) = std::env::var(LOG_FORMAT_ENV) {
            if let Ok(format) = format.parse() {
                self.format = format;
            }
        }
    }
}

/// Initialize the global logging system
pub fn init_logging(config: LoggingConfig) -> Result<()> {
    let env_filter = EnvFilter::try_new(&config.level)
        .map_err(|e| Error::config(format!("invalid log filter '{}': {}", config.level, e)))?;
    let ansi = config.ansi && std::io::stderr().is_terminal();

    // One subscriber type per format
    let installed = match config.format {
        LogFormat::Compact => {
            let subscriber = tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_ansi(ansi)
                .with_thread_ids(config.thread_ids)
                .with_file(config.source_location)
                .with_line_number(config.source_location)
                .compact()
                .finish();
            tracing::subscriber::set_global_default(subscriber)
        }
        LogFormat::Json => {
            let subscriber = tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_ansi(false)
                .with_thread_ids(config.thread_ids)
                .with_file(config.source_location)
                .with_line_number(config.source_location)
                .json()
                .finish();
            tracing::subscriber::set_global_default(subscriber)
        }
        LogFormat::Full => {
            let subscriber = tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_ansi(ansi)
                .with_thread_ids(config.thread_ids)
                .with_file(config.source_location)
                .with_line_number(config.source_location)
                .finish();
            tracing::subscriber::set_global_default(subscriber)
        }
    };
    installed.map_err(|e| Error::other(format!("Failed to initialize logging: {}", e)))?;

    let session_id = SESSION_ID.get_or_init(generate_session_id);

    tracing::info!(
        session_id = %session_id,
        level = %config.level,
        format = ?config.format,
        "Logging system initialized"
    );

    Ok(())
}

/// Generate a unique ID for this process
pub fn generate_session_id() -> String {
    format!("sess_{}", Uuid::new_v4().simple())
}

/// Get the current session ID
pub fn current_session_id() -> Option<&'static str> {
    SESSION_ID.get().map(|s| s.as_str())
}

/// Create a span with session ID and timing
pub fn create_operation_span(operation: &str, details: Option<&str>) -> Span {
    tracing::info_span!(
        "operation",
        operation = operation,
        session_id = current_session_id().unwrap_or("unknown"),
        details = details.unwrap_or(""),
        duration_ms = field::Empty,
    )
}

/// Redaction of credentials in payloads headed for the log
pub mod redaction {
    use serde_json::Value;

    /// Redact key material from a JSON value in place
    pub fn redact_json_value(value: &mut Value) {
        match value {
            Value::Object(map) => {
                for (key, val) in map.iter_mut() {
                    if is_sensitive_key(key) {
                        *val = Value::String("***".to_string());
                    } else {
                        redact_json_value(val);
                    }
                }
            }
            Value::Array(items) => {
                for item in items.iter_mut() {
                    redact_json_value(item);
                }
            }
            Value::String(s) => {
                *s = abstractapi_core::redaction::redact_query_keys(s);
            }
            _ => {}
        }
    }

    /// Redacted copy of a JSON value, for logging
    pub fn redacted(value: &Value) -> Value {
        let mut copy = value.clone();
        redact_json_value(&mut copy);
        copy
    }

    fn is_sensitive_key(key: &str) -> bool {
        let key = key.to_lowercase();
        key.contains("key")
            || key.contains("token")
            || key.contains("secret")
            || key.contains("password")
            || key.contains("auth")
    }
}

/// Performance timing utilities
pub mod timing {
    use std::time::Instant;
    use tracing::Span;

    /// A timer that logs its duration when dropped
    pub struct Timer {
        start: Instant,
        span: Span,
        operation: String,
    }

    impl Timer {
        pub fn new(operation: &str) -> Self {
            Self {
                start: Instant::now(),
                span: super::create_operation_span(operation, None),
                operation: operation.to_string(),
            }
        }

        pub fn with_details(operation: &str, details: &str) -> Self {
            Self {
                start: Instant::now(),
                span: super::create_operation_span(operation, Some(details)),
                operation: operation.to_string(),
            }
        }

        /// Get elapsed time without finishing the timer
        pub fn elapsed(&self) -> std::time::Duration {
            self.start.elapsed()
        }
    }

    impl Drop for Timer {
        fn drop(&mut self) {
            let duration = self.start.elapsed();
            self.span.record("duration_ms", duration.as_millis() as u64);

            tracing::debug!(
                operation = %self.operation,
                duration_ms = duration.as_millis() as u64,
                "Operation completed"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LoggingSection;
    use serial_test::serial;

    #[test]
    fn test_logging_config_from_verbosity() {
        let config = LoggingConfig::from_verbosity(0);
        assert_eq!(config.level, "warn");
        assert!(!config.source_location);

        let config = LoggingConfig::from_verbosity(1);
        assert_eq!(config.level, "info");

        let config = LoggingConfig::from_verbosity(2);
        assert_eq!(config.level, "debug");
        assert!(config.source_location);

        let config = LoggingConfig::from_verbosity(3);
        assert_eq!(config.level, "trace");
        assert!(config.thread_ids);
        assert_eq!(config.format, LogFormat::Full);
    }

    #[test]
    fn test_log_format_parsing() {
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!(" compact ".parse::<LogFormat>().unwrap(), LogFormat::Compact);
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_file_level_yields_to_verbosity_flag() {
        let section = LoggingSection {
            level: Some("error".to_string()),
            format: Some("json".to_string()),
        };

        let mut config = LoggingConfig::from_verbosity(0);
        config.merge_with_file(&section, 0);
        assert_eq!(config.level, "error");
        assert_eq!(config.format, LogFormat::Json);

        let mut config = LoggingConfig::from_verbosity(2);
        config.merge_with_file(&section, 2);
        assert_eq!(config.level, "debug");
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        std::env::set_var("RUST_LOG", "abstractapi_core=trace");
        std::env::set_var(LOG_FORMAT_ENV, "json");

        let mut config = LoggingConfig::default();
        config.merge_with_env();
        assert_eq!(config.level, "abstractapi_core=trace");
        assert_eq!(config.format, LogFormat::Json);

        std::env::remove_var("RUST_LOG");
        std::env::remove_var(LOG_FORMAT_ENV);
    }

    #[test]
    fn test_json_redaction() {
        let value = serde_json::json!({
            "name": "verify_email",
            "arguments": {"email": "user@example.com", "api_key": "abc123"},
            "note": "retry with api_key=abc123"
        });

        let redacted = redaction::redacted(&value);
        assert_eq!(redacted["arguments"]["api_key"], "***");
        assert_eq!(redacted["arguments"]["email"], "user@example.com");
        assert!(!redacted.to_string().contains("abc123"));
    }

    #[test]
    fn test_session_id_format() {
        let id = generate_session_id();
        assert!(id.starts_with("sess_"));
        assert_eq!(id.len(), "sess_".len() + 32);
        assert_ne!(id, generate_session_id());
    }
}
