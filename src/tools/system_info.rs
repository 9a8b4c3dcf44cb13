/// System Info Tool
///
/// Reports the current date, time, timezone and server version.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Deserialize;

use crate::core::error::ToolError;
use crate::core::registry::{Tool, parse_args};
use crate::core::schema::{Arguments, Param, ParameterSchema};
use crate::tools::ToolId;

pub const GUIDANCE: &str =
    "This is a template MCP server. Customize the tools in src/tools/ for your use case.";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InfoKind {
    Date,
    Timezone,
    Version,
    #[default]
    All,
}

#[derive(Debug, Deserialize)]
struct SystemInfoArgs {
    #[serde(default)]
    info: InfoKind,
}

/// Render the report for `kind`. Pure so tests can pin the clock.
pub fn render(kind: InfoKind, now: DateTime<Utc>, timezone: &str, version: &str) -> String {
    let date = format!("Current date: {}", now.format("%Y-%m-%d"));
    let timezone = format!("Timezone: {}", timezone);
    let version = format!("Server version: {}", version);

    match kind {
        InfoKind::Date => date,
        InfoKind::Timezone => timezone,
        InfoKind::Version => version,
        InfoKind::All => [
            date,
            format!("Current time: {}", now.to_rfc3339_opts(SecondsFormat::Millis, true)),
            timezone,
            version,
            String::new(),
            GUIDANCE.to_string(),
        ]
        .join("\n"),
    }
}

/// IANA name of the process's timezone, `UTC` if the OS can't tell us.
pub fn resolve_timezone() -> String {
    iana_time_zone::get_timezone().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "could not resolve local timezone, reporting UTC");
        "UTC".to_string()
    })
}

pub struct SystemInfoTool {
    version: String,
}

impl SystemInfoTool {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
        }
    }
}

#[async_trait]
impl Tool for SystemInfoTool {
    fn id(&self) -> ToolId {
        ToolId::SystemInfo
    }

    fn description(&self) -> &'static str {
        "Get system information such as the current date, timezone and server version"
    }

    fn parameters(&self) -> ParameterSchema {
        ParameterSchema::new().param(
            Param::one_of(
                "info",
                &["date", "timezone", "version", "all"],
                "Type of information to retrieve",
            )
            .default("all"),
        )
    }

    async fn call(&self, args: Arguments) -> Result<String, ToolError> {
        let args: SystemInfoArgs = parse_args(args)?;
        Ok(render(args.info, Utc::now(), &resolve_timezone(), &self.version))
    }
}
