//! Tool registry for the external dispatch harness
//!
//! The registry is an explicit lookup table from operation name to handler,
//! built once at start-up. The harness resolves a call name, hands over the
//! argument map, and relays whatever comes back.

use crate::operations::{
    AbstractClient, CheckEmailReputationTool, OperationResult, ValidatePhoneTool, VerifyEmailTool,
};
use async_trait::async_trait;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;

/// A callable operation exposed to tool-calling clients
#[async_trait]
pub trait Tool: Send + Sync {
    /// Dispatch name
    fn name(&self) -> &'static str;

    /// Human-readable description shown to the client
    fn description(&self) -> &'static str;

    /// JSON Schema of the argument object
    fn input_schema(&self) -> Value;

    /// Decode arguments and run the operation
    async fn call(&self, arguments: &Map<String, Value>) -> OperationResult;
}

/// Public description of a registered tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

/// Error from registry operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// Tool already registered
    #[error("Tool already registered: {name}")]
    AlreadyRegistered { name: String },

    /// Tool not found
    #[error("Tool not found: {name}")]
    NotFound { name: String },
}

/// Registry of tools, in registration order
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: IndexMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Create a new empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the three validation tools backed by `client`
    pub fn with_default_tools(client: AbstractClient) -> Self {
        let client = Arc::new(client);
        let mut registry = Self::new();
        let tools: [Arc<dyn Tool>; 3] = [
            Arc::new(VerifyEmailTool::new(client.clone())),
            Arc::new(ValidatePhoneTool::new(client.clone())),
            Arc::new(CheckEmailReputationTool::new(client)),
        ];
        for tool in tools {
            registry.tools.insert(tool.name().to_string(), tool);
        }
        debug_assert_eq!(registry.tools.len(), 3, "default tool names must be distinct");
        registry
    }

    /// Register a tool
    ///
    /// # Errors
    ///
    /// Returns error if a tool with the same name is already registered
    pub fn register(&mut self, tool: Arc<dyn Tool>) -> Result<(), RegistryError> {
        let name = tool.name().to_string();
        if self.tools.contains_key(&name) {
            return Err(RegistryError::AlreadyRegistered { name });
        }
        self.tools.insert(name, tool);
        Ok(())
    }

    /// Look up a tool by name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// Registered names, in registration order
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.tools.keys().map(String::as_str).collect()
    }

    /// Descriptors of every registered tool
    #[must_use]
    pub fn descriptors(&self) -> Vec<ToolDescriptor> {
        self.tools
            .values()
            .map(|tool| ToolDescriptor {
                name: tool.name().to_string(),
                description: tool.description().to_string(),
                input_schema: tool.input_schema(),
            })
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Dispatch a call by name
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] for an unknown name; operation
    /// failures are carried inside the [`OperationResult`].
    pub async fn call(
        &self,
        name: &str,
        arguments: &Map<String, Value>,
    ) -> Result<OperationResult, RegistryError> {
        let tool = self.get(name).ok_or_else(|| RegistryError::NotFound {
            name: name.to_string(),
        })?;
        Ok(tool.call(arguments).await)
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.names())
            .finish()
    }
}
