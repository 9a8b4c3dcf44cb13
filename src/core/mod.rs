/// Core Server Framework Module
///
/// - config.rs: environment and YAML configuration
/// - error.rs: error types for each layer
/// - format.rs: JSON response formatting
/// - protocol.rs: JSON-RPC and MCP message types
/// - registry.rs: the `Tool` trait and tool registry
/// - schema.rs: tool parameter declarations and argument validation
/// - server.rs: request dispatch plus HTTP and STDIO transports

pub mod config;
pub mod error;
pub mod format;
pub mod protocol;
pub mod registry;
pub mod schema;
pub mod server;
