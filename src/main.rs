/// MCP Server Entry Point
///
/// Reads configuration from the environment, builds the tool registry and
/// starts the transport selected by MCP_TRANSPORT_MODE.
///
/// Environment Variables:
/// - SERVER_NAME: Name of the server (default: "mcp-server")
/// - SERVER_VERSION: Version string (default: the crate version)
/// - MCP_TRANSPORT_MODE: "stdio", "http", or "both" (default: "both")
/// - HOST: Bind address for HTTP mode (default: "0.0.0.0")
/// - PORT: Port number for HTTP mode (default: 3000)
/// - WORKER_THREADS: HTTP worker count (default: CPU count, max 16)
/// - MCP_CONFIG_PATH: Tool settings file (default: "kmcp.yaml")
/// - RUST_LOG: Log filter (default: "info")
/// - LOG_FORMAT: "json" for JSON log lines, anything else for plain text

mod core;
mod tools;

use anyhow::Context;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use crate::core::config::{ServerConfig, ToolSettings, TransportMode};
use crate::core::server::{self, AppState, Dispatcher};

/// Logs always go to stderr; stdout belongs to the STDIO transport.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    if std::env::var("LOG_FORMAT").is_ok_and(|f| f == "json") {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = ServerConfig::from_env().context("invalid server configuration")?;
    let settings = ToolSettings::load(&config.config_path).context("failed to load tool settings")?;
    let registry = tools::initialize_tools(&settings, &config.version)
        .context("failed to initialize tools")?;

    let dispatcher = Arc::new(Dispatcher::new(
        AppState {
            server_name: config.name.clone(),
            server_version: config.version.clone(),
        },
        registry,
    ));

    match config.transport {
        TransportMode::Stdio => server::run_server_stdio(dispatcher).await?,
        TransportMode::Http => server::run_server_http(dispatcher, &config).await?,
        TransportMode::Both => {
            // STDIO in the background for local clients, HTTP in the foreground
            let stdio_dispatcher = dispatcher.clone();
            let stdio = tokio::spawn(async move {
                if let Err(e) = server::run_server_stdio(stdio_dispatcher).await {
                    tracing::error!(error = %e, "STDIO server error");
                }
            });
            let http_result = server::run_server_http(dispatcher, &config).await;
            stdio.abort();
            http_result?;
        }
    }

    tracing::info!("MCP server stopped");
    Ok(())
}
