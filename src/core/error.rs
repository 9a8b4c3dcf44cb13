/// Error Types
///
/// Each layer of the server has its own error type. Only `DispatchError`
/// reaches the client as a JSON-RPC error; `ToolError` is rendered in-band
/// as an "Error: ..." text block by the call boundary.

use std::path::PathBuf;
use thiserror::Error;

use crate::core::protocol::MCPError;
use crate::tools::ToolId;

/// Raised when call arguments violate a tool's declared parameter schema.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("arguments must be a JSON object")]
    NotAnObject,

    #[error("missing required parameter: {0}")]
    Missing(String),

    #[error("parameter '{name}' must be {expected}")]
    WrongType { name: String, expected: &'static str },

    #[error("parameter '{name}' must be between {min} and {max}, got {value}")]
    OutOfRange {
        name: String,
        min: i64,
        max: i64,
        value: i64,
    },

    #[error("parameter '{name}' must be one of [{allowed}], got '{value}'")]
    NotInEnum {
        name: String,
        allowed: String,
        value: String,
    },
}

/// Failure inside a tool handler body.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("invalid arguments: {0}")]
    Arguments(#[source] serde_json::Error),

    #[error("failed to format response: {0}")]
    Format(#[from] serde_json::Error),
}

#[derive(Debug, Error, PartialEq)]
pub enum RegistryError {
    #[error("tool '{0}' is already registered")]
    DuplicateTool(ToolId),
}

/// Protocol-level failure of a `tools/call` request.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Invalid params")]
    MissingParams,

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Invalid arguments for tool '{tool}': {source}")]
    InvalidArguments {
        tool: ToolId,
        #[source]
        source: ValidationError,
    },
}

impl DispatchError {
    pub fn to_rpc_error(&self) -> MCPError {
        match self {
            DispatchError::UnknownTool(_) => MCPError::method_not_found(self.to_string()),
            DispatchError::MissingParams | DispatchError::InvalidArguments { .. } => {
                MCPError::invalid_params(self.to_string())
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid transport mode '{0}', must be 'stdio', 'http', or 'both'")]
    InvalidTransport(String),

    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid settings for tool '{tool}': {source}")]
    ToolSettings {
        tool: ToolId,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Registry(#[from] RegistryError),
}
