/// Tool Registry
///
/// Tools implement the shared `Tool` trait and are registered under their
/// `ToolId`. External callers still address tools by name; the name is
/// resolved to a `ToolId` before the handler is looked up.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::core::error::{RegistryError, ToolError};
use crate::core::protocol::MCPTool;
use crate::core::schema::{Arguments, ParameterSchema};
use crate::tools::ToolId;

#[async_trait]
pub trait Tool: Send + Sync {
    fn id(&self) -> ToolId;

    fn description(&self) -> &'static str;

    fn parameters(&self) -> ParameterSchema;

    /// Run the tool on arguments that already passed `parameters()` validation.
    async fn call(&self, args: Arguments) -> Result<String, ToolError>;

    fn descriptor(&self) -> MCPTool {
        MCPTool {
            name: self.id().as_str().to_string(),
            description: self.description().to_string(),
            input_schema: self.parameters().to_json_schema(),
        }
    }
}

/// Deserialize validated arguments into a tool's typed argument struct.
pub fn parse_args<T: DeserializeOwned>(args: Arguments) -> Result<T, ToolError> {
    serde_json::from_value(serde_json::Value::Object(args)).map_err(ToolError::Arguments)
}

#[derive(Default)]
pub struct ToolRegistry {
    tools: BTreeMap<ToolId, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, tool: Arc<dyn Tool>) -> Result<(), RegistryError> {
        let id = tool.id();
        if self.tools.contains_key(&id) {
            return Err(RegistryError::DuplicateTool(id));
        }
        self.tools.insert(id, tool);
        Ok(())
    }

    pub fn get(&self, id: ToolId) -> Option<Arc<dyn Tool>> {
        self.tools.get(&id).cloned()
    }

    /// Resolve an external tool name.
    pub fn lookup(&self, name: &str) -> Option<Arc<dyn Tool>> {
        ToolId::from_name(name).and_then(|id| self.get(id))
    }

    /// Descriptors for tools/list, in `ToolId` order.
    pub fn descriptors(&self) -> Vec<MCPTool> {
        self.tools.values().map(|t| t.descriptor()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }
}
