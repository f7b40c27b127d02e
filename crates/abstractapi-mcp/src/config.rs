//! Configuration management for the CLI
//!
//! This module handles loading and merging configuration from:
//! - Default values
//! - Configuration files (YAML/JSON)
//! - Environment variables
//! - Command-line arguments

use crate::error::{Error, Result};
use abstractapi_core::{ServiceConfig, TimeoutConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// API key for the upstream service
    pub api_key: Option<String>,

    /// Total request timeout in seconds
    pub timeout_secs: Option<u64>,

    /// Connection timeout in seconds
    pub connect_timeout_secs: Option<u64>,

    /// Endpoint URL overrides
    pub endpoints: EndpointOverrides,

    /// Logging settings
    pub logging: LoggingSection,

    /// Default-location files that were found but could not be read
    #[serde(skip)]
    pub load_warnings: Vec<String>,
}

/// Per-endpoint URL overrides
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EndpointOverrides {
    pub email_validation: Option<String>,
    pub phone_validation: Option<String>,
    pub email_reputation: Option<String>,
}

/// Logging configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingSection {
    /// Log level (trace, debug, info, warn, error)
    pub level: Option<String>,

    /// Log format (compact, full, json)
    pub format: Option<String>,
}

/// Values supplied on the command line, applied last
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub api_key: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;

        let config = match path.extension().and_then(|s| s.to_str()) {
            Some("yaml") | Some("yml") => serde_yaml::from_str(&content)?,
            _ => serde_json::from_str(&content)?,
        };

        Ok(config)
    }

    /// Load configuration from default locations
    pub fn load() -> Self {
        let mut warnings = Vec::new();

        for path in Self::default_config_paths() {
            if !path.exists() {
                continue;
            }
            match Self::from_file(&path) {
                Ok(mut config) => {
                    config.load_warnings = warnings;
                    return config;
                }
                Err(e) => {
                    warnings.push(format!("Failed to load config from {}: {}", path.display(), e))
                }
            }
        }

        Self {
            load_warnings: warnings,
            ..Self::default()
        }
    }

    /// Load configuration from a specific file or default locations
    pub fn load_with_file(file: Option<&Path>) -> Result<Self> {
        match file {
            Some(path) => Self::from_file(path),
            None => Ok(Self::load()),
        }
    }

    /// Get default configuration file paths to check
    fn default_config_paths() -> Vec<PathBuf> {
        let mut paths = vec![
            PathBuf::from(".abstractapi-mcp.yaml"),
            PathBuf::from(".abstractapi-mcp.json"),
        ];

        if let Some(config_dir) = dirs::config_dir() {
            let dir = config_dir.join("abstractapi-mcp");
            paths.push(dir.join("config.yaml"));
            paths.push(dir.join("config.json"));
        }

        if let Some(home_dir) = dirs::home_dir() {
            paths.push(home_dir.join(".abstractapi-mcp.yaml"));
            paths.push(home_dir.join(".abstractapi-mcp.json"));
        }

        paths
    }

    /// Resolve the service configuration.
    ///
    /// Precedence, lowest first: built-in defaults, this file, the process
    /// environment, then command-line flags.
    pub fn to_service_config(&self, cli: &CliOverrides) -> Result<ServiceConfig> {
        let mut builder = ServiceConfig::builder();

        if let Some(key) = &self.api_key {
            builder = builder.api_key(key.as_str());
        }

        let defaults = TimeoutConfig::default();
        let connect = self
            .connect_timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(defaults.connect_timeout);
        let timeouts = match self.timeout_secs {
            Some(secs) => TimeoutConfig::new(connect, Duration::from_secs(secs)),
            None => TimeoutConfig::new(connect, defaults.request_timeout),
        };
        if timeouts.request_timeout < timeouts.connect_timeout {
            return Err(Error::config(
                "timeout_secs must be at least connect_timeout_secs",
            ));
        }
        builder = builder.timeouts(timeouts);

        if let Some(url) = &self.endpoints.email_validation {
            builder = builder.email_validation_url(url.as_str());
        }
        if let Some(url) = &self.endpoints.phone_validation {
            builder = builder.phone_validation_url(url.as_str());
        }
        if let Some(url) = &self.endpoints.email_reputation {
            builder = builder.email_reputation_url(url.as_str());
        }

        builder = builder.merge_env()?;

        if let Some(key) = &cli.api_key {
            builder = builder.api_key(key.as_str());
        }
        if let Some(secs) = cli.timeout_secs {
            builder = builder.request_timeout(Duration::from_secs(secs));
        }

        Ok(builder.build()?)
    }
}
