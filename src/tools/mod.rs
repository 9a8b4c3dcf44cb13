/// Tools Module
///
/// This module contains all MCP tool implementations. Every tool has a
/// `ToolId` variant; `initialize_tools` builds one handler per variant.

pub mod data_lookup;
pub mod system_info;

use std::fmt;
use std::sync::Arc;

use crate::core::config::ToolSettings;
use crate::core::error::ConfigError;
use crate::core::registry::{Tool, ToolRegistry};

/// Identifier of every tool this server exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ToolId {
    DataLookup,
    SystemInfo,
}

impl ToolId {
    pub const ALL: [ToolId; 2] = [ToolId::DataLookup, ToolId::SystemInfo];

    /// External name used in tools/list and tools/call.
    pub fn as_str(self) -> &'static str {
        match self {
            ToolId::DataLookup => "data-lookup",
            ToolId::SystemInfo => "system-info",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|id| id.as_str() == name)
    }
}

impl fmt::Display for ToolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Build the registry with one handler per `ToolId`.
///
/// `version` is the server's declared version, reported by system-info.
pub fn initialize_tools(settings: &ToolSettings, version: &str) -> Result<ToolRegistry, ConfigError> {
    let tools = ToolId::ALL
        .into_iter()
        .map(|id| -> Result<Arc<dyn Tool>, ConfigError> {
            let tool: Arc<dyn Tool> = match id {
                ToolId::DataLookup => Arc::new(data_lookup::DataLookupTool::from_settings(settings)?),
                ToolId::SystemInfo => Arc::new(system_info::SystemInfoTool::new(version)),
            };
            Ok(tool)
        })
        .collect::<Result<Vec<_>, _>>()?;

    let registry = register_all(tools)?;
    tracing::info!(count = registry.len(), "registered tools");
    Ok(registry)
}

/// Register every tool, failing on the first duplicate `ToolId`.
fn register_all(tools: Vec<Arc<dyn Tool>>) -> Result<ToolRegistry, ConfigError> {
    let mut registry = ToolRegistry::new();
    for tool in tools {
        registry.register(tool)?;
    }
    Ok(registry)
}
