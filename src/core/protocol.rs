/// MCP Protocol Types
///
/// JSON-RPC 2.0 request/response structures and the MCP payloads carried
/// inside them (tool descriptors and tool call results).

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// MCP protocol revision reported in initialize responses
pub const PROTOCOL_VERSION: &str = "2024-11-05";

pub const JSONRPC_VERSION: &str = "2.0";

/// JSON-RPC 2.0 request structure for MCP protocol.
///
/// All MCP requests follow the JSON-RPC 2.0 specification. The jsonrpc field
/// must be "2.0", method names the MCP method to call, and params carries
/// method-specific parameters.
#[derive(Deserialize, Debug, Clone)]
pub struct MCPRequest {
    /// JSON-RPC version identifier, must be "2.0"
    pub jsonrpc: String,
    /// Request ID for correlating responses.
    ///
    /// None only when the member is absent, which marks a notification.
    /// An explicit `"id": null` is kept as `Some(Value::Null)` so the
    /// request is still answered.
    #[serde(default, deserialize_with = "present_id")]
    pub id: Option<Value>,
    /// MCP method name (e.g., "initialize", "tools/list", "tools/call")
    pub method: String,
    /// Method-specific parameters as JSON value
    #[serde(default)]
    pub params: Option<Value>,
}

// Only called when the member exists, so null becomes Some(Null).
fn present_id<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl MCPRequest {
    /// Notifications are one-way messages that never receive a response.
    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

/// JSON-RPC 2.0 response structure for MCP protocol.
///
/// Responses must include jsonrpc "2.0", the request id, and either a result
/// or an error, never both.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct MCPResponse {
    /// JSON-RPC version identifier, always "2.0"
    pub jsonrpc: String,
    /// Request ID from the original request, null if it could not be read
    pub id: Option<Value>,
    /// Response result, present when the request succeeded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Error information, present when the request failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<MCPError>,
}

impl MCPResponse {
    pub fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn error(id: Option<Value>, error: MCPError) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: None,
            error: Some(error),
        }
    }
}

/// JSON-RPC 2.0 error structure.
///
/// Errors follow the JSON-RPC 2.0 error format with a numeric code, message,
/// and optional additional data.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MCPError {
    /// JSON-RPC error code (e.g., -32601 for method not found)
    pub code: i32,
    /// Human-readable error message
    pub message: String,
    /// Optional additional error data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl MCPError {
    pub const PARSE_ERROR: i32 = -32700;
    pub const INVALID_REQUEST: i32 = -32600;
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;

    fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    pub fn parse_error(detail: impl std::fmt::Display) -> Self {
        Self::new(Self::PARSE_ERROR, format!("Parse error: {}", detail))
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(Self::INVALID_REQUEST, message)
    }

    pub fn method_not_found(message: impl Into<String>) -> Self {
        Self::new(Self::METHOD_NOT_FOUND, message)
    }

    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::new(Self::INVALID_PARAMS, message)
    }
}

/// MCP tool definition structure.
///
/// Each tool has a unique name, a description, and a JSON schema defining
/// its input parameters. This structure is serialized when listing tools.
#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct MCPTool {
    /// Unique tool identifier (e.g., "data-lookup", "system-info")
    pub name: String,
    /// Human-readable description of what the tool does
    pub description: String,
    /// JSON Schema defining the tool's input parameters (`inputSchema` on the wire)
    pub input_schema: Value,
}

/// A single block of tool output. Only text is produced by this server.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentBlock {
    Text { text: String },
}

impl ContentBlock {
    pub fn text(text: impl Into<String>) -> Self {
        ContentBlock::Text { text: text.into() }
    }

    pub fn as_text(&self) -> &str {
        match self {
            ContentBlock::Text { text } => text,
        }
    }
}

/// Envelope returned by tools/call.
///
/// Handler failures are still successful JSON-RPC responses; `is_error`
/// tells the client the text describes a failure.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CallToolResult {
    /// Output blocks, always exactly one text block from this server
    pub content: Vec<ContentBlock>,
    /// True when the handler failed and the text starts with "Error: "
    pub is_error: bool,
}

impl CallToolResult {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ContentBlock::text(text)],
            is_error: false,
        }
    }

    /// Handler failure rendered in-band. An empty message gets a generic phrase.
    pub fn error(message: &str) -> Self {
        let message = if message.trim().is_empty() {
            "Unknown error occurred"
        } else {
            message
        };
        Self {
            content: vec![ContentBlock::text(format!("Error: {}", message))],
            is_error: true,
        }
    }
}
