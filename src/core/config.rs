/// Configuration
///
/// Server settings come from environment variables. Tool-specific settings
/// come from an optional YAML file (kmcp.yaml by default) with a `tools`
/// section keyed by tool name:
///
/// ```yaml
/// tools:
///   data-lookup:
///     delay_ms: 100
/// ```

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::core::error::ConfigError;
use crate::tools::ToolId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportMode {
    /// Line-delimited JSON-RPC over stdin/stdout (MCP Inspector, local clients)
    Stdio,
    /// JSON-RPC over HTTP POST with Actix Web
    Http,
    /// STDIO in the background, HTTP in the foreground
    Both,
}

impl std::str::FromStr for TransportMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stdio" => Ok(TransportMode::Stdio),
            "http" => Ok(TransportMode::Http),
            "both" => Ok(TransportMode::Both),
            other => Err(ConfigError::InvalidTransport(other.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Reported in initialize responses and the health probe
    pub name: String,
    /// Reported in initialize responses and by the system-info tool
    pub version: String,
    pub transport: TransportMode,
    pub host: String,
    pub port: u16,
    /// Overrides the CPU-derived HTTP worker count
    pub workers: Option<usize>,
    pub config_path: PathBuf,
}

impl ServerConfig {
    pub const DEFAULT_PORT: u16 = 3000;

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_vars<F>(var: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str, default: &str| var(key).unwrap_or_else(|| default.to_string());

        let transport = get("MCP_TRANSPORT_MODE", "both").parse()?;

        let port = match var("PORT") {
            Some(raw) => raw.parse::<u16>().unwrap_or_else(|e| {
                tracing::warn!(port = %raw, error = %e, "invalid PORT, using default");
                Self::DEFAULT_PORT
            }),
            None => Self::DEFAULT_PORT,
        };

        let workers = var("WORKER_THREADS").and_then(|s| s.parse::<usize>().ok());

        Ok(Self {
            name: get("SERVER_NAME", "mcp-server"),
            version: get("SERVER_VERSION", env!("CARGO_PKG_VERSION")),
            transport,
            host: get("HOST", "0.0.0.0"),
            port,
            workers,
            config_path: PathBuf::from(get("MCP_CONFIG_PATH", "kmcp.yaml")),
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// CPU count capped at 16 unless overridden.
    pub fn worker_count(&self) -> usize {
        self.workers
            .unwrap_or_else(|| num_cpus::get().min(16))
            .max(1)
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    tools: HashMap<String, Value>,
}

/// Per-tool settings loaded from the YAML config file.
#[derive(Debug, Clone, Default)]
pub struct ToolSettings {
    tools: HashMap<String, Value>,
}

impl ToolSettings {
    /// Load settings from `path`. A missing file yields empty settings.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        Self::from_yaml(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_yaml(raw: &str) -> Result<Self, serde_yaml::Error> {
        // An empty document deserializes to unit, not a mapping
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        let file: ConfigFile = serde_yaml::from_str(raw)?;
        Ok(Self { tools: file.tools })
    }

    /// Typed settings for one tool; absent sections deserialize from `{}`.
    pub fn for_tool<T>(&self, tool: ToolId) -> Result<T, ConfigError>
    where
        T: DeserializeOwned,
    {
        let section = self
            .tools
            .get(tool.as_str())
            .cloned()
            .unwrap_or_else(|| Value::Object(Default::default()));
        serde_json::from_value(section).map_err(|source| ConfigError::ToolSettings { tool, source })
    }
}
