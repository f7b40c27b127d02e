//! Output formatting for the one-shot subcommands
//!
//! Only `call` and `tools` print to stdout; `serve` owns stdout for protocol
//! traffic and never goes through this module.

use crate::cli::OutputFormat;
use crate::error::Result;
use abstractapi_core::{ServiceError, ToolDescriptor};
use colored::Colorize;
use serde::Serialize;
use serde_json::{Map, Value};
use std::io::{self, Write};

/// Output writer that handles different output formats and colors
pub struct OutputWriter {
    format: OutputFormat,
    use_color: bool,
    writer: Box<dyn Write + Send>,
}

impl OutputWriter {
    /// Create a new output writer on stdout
    pub fn new(format: OutputFormat, use_color: bool) -> Self {
        Self::with_writer(format, use_color, Box::new(io::stdout()))
    }

    /// Create an output writer with a custom writer
    pub fn with_writer(format: OutputFormat, use_color: bool, writer: Box<dyn Write + Send>) -> Self {
        Self {
            format,
            use_color,
            writer,
        }
    }

    fn serialize<T: Serialize>(&self, value: &T) -> Result<String> {
        Ok(match self.format {
            OutputFormat::Json => serde_json::to_string(value)?,
            OutputFormat::JsonPretty | OutputFormat::Human => serde_json::to_string_pretty(value)?,
        })
    }

    fn line(&mut self, text: &str) -> Result<()> {
        writeln!(self.writer, "{}", text)?;
        Ok(())
    }

    /// Print a successful tool result
    pub fn tool_result(&mut self, tool: &str, mapping: &Map<String, Value>) -> Result<()> {
        let body = self.serialize(mapping)?;
        if self.format == OutputFormat::Human {
            let header = format!("{} result", tool);
            let header = if self.use_color {
                header.green().bold().to_string()
            } else {
                header
            };
            self.line(&header)?;
        }
        self.line(&body)
    }

    /// Print a failed tool result; machine formats keep it on stdout
    pub fn tool_error(&mut self, error: &ServiceError) -> Result<()> {
        if self.format == OutputFormat::Human {
            return Ok(());
        }
        let body = self.serialize(&serde_json::json!({ "error": error }))?;
        self.line(&body)
    }

    /// Print the tool catalogue
    pub fn tools(&mut self, tools: &[ToolDescriptor]) -> Result<()> {
        if self.format != OutputFormat::Human {
            let body = self.serialize(&tools)?;
            return self.line(&body);
        }

        for tool in tools {
            let name = if self.use_color {
                tool.name.cyan().bold().to_string()
            } else {
                tool.name.clone()
            };
            self.line(&name)?;
            self.line(&format!("  {}", tool.description))?;

            let required: Vec<&str> = tool.input_schema["required"]
                .as_array()
                .map(|items| items.iter().filter_map(Value::as_str).collect())
                .unwrap_or_default();
            let properties = tool.input_schema["properties"]
                .as_object()
                .map(|p| p.keys().map(String::as_str).collect::<Vec<_>>())
                .unwrap_or_default();
            for property in properties {
                let marker = if required.contains(&property) {
                    "required"
                } else {
                    "optional"
                };
                self.line(&format!("    {} ({})", property, marker))?;
            }
        }
        Ok(())
    }
}
