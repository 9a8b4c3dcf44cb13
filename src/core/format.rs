/// Response Formatting
///
/// Renders tool results as JSON text in the output mode the caller asked for.

use serde::{Deserialize, Serialize};

/// Names accepted by the `outputMode` tool parameter.
pub const OUTPUT_MODES: &[&str] = &["json", "compact-json"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputMode {
    /// 2-space indented JSON
    #[default]
    #[serde(rename = "json")]
    Json,
    /// JSON without any inserted whitespace
    #[serde(rename = "compact-json")]
    CompactJson,
}

/// Serialize `value` according to `mode`.
///
/// A compact serialization failure is logged and retried once as pretty
/// JSON; if that fails too the error is returned to the caller.
pub fn format_response<T>(value: &T, mode: OutputMode) -> Result<String, serde_json::Error>
where
    T: Serialize + ?Sized,
{
    match mode {
        OutputMode::Json => serde_json::to_string_pretty(value),
        OutputMode::CompactJson => serde_json::to_string(value).or_else(|e| {
            tracing::warn!(error = %e, "compact serialization failed, retrying as pretty JSON");
            serde_json::to_string_pretty(value)
        }),
    }
}
