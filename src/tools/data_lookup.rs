/// Data Lookup Tool
///
/// Searches a small fixed set of example records. Replace `fixture_items`
/// with a real data source to turn this into a production lookup tool.

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;

use crate::core::config::ToolSettings;
use crate::core::error::{ConfigError, ToolError};
use crate::core::format::{OUTPUT_MODES, OutputMode, format_response};
use crate::core::registry::{Tool, parse_args};
use crate::core::schema::{Arguments, Param, ParameterSchema};
use crate::tools::ToolId;

/// Tag added to `metadata.source` when metadata is requested
pub const METADATA_SOURCE: &str = "example-data";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
    pub created_at: String,
    pub updated_at: String,
}

impl Item {
    /// `needle` must already be lowercase.
    fn matches(&self, needle: &str) -> bool {
        [&self.title, &self.description, &self.category]
            .iter()
            .any(|field| field.to_lowercase().contains(needle))
    }

    /// Copy of this item with processing metadata merged into its own.
    fn with_processing_metadata(&self, processed_at: &str) -> Item {
        let mut metadata = self.metadata.clone().unwrap_or_default();
        metadata.insert("processingTime".into(), Value::from(processed_at));
        metadata.insert("source".into(), Value::from(METADATA_SOURCE));
        Item {
            metadata: Some(metadata),
            ..self.clone()
        }
    }
}

fn item(
    id: &str,
    title: &str,
    description: &str,
    category: &str,
    metadata: Option<Value>,
    created_at: &str,
    updated_at: &str,
) -> Item {
    Item {
        id: id.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        category: category.to_string(),
        metadata: metadata.and_then(|m| match m {
            Value::Object(map) => Some(map),
            _ => None,
        }),
        created_at: created_at.to_string(),
        updated_at: updated_at.to_string(),
    }
}

/// Example records, built fresh for every call.
pub fn fixture_items() -> Vec<Item> {
    vec![
        item(
            "1",
            "Sample Item 1",
            "This is a sample item for demonstration",
            "example",
            Some(serde_json::json!({ "priority": "high", "tags": ["demo", "test"] })),
            "2024-01-01T00:00:00.000Z",
            "2024-01-01T00:00:00.000Z",
        ),
        item(
            "2",
            "Sample Item 2",
            "Another sample item with different properties",
            "example",
            Some(serde_json::json!({ "priority": "medium", "tags": ["demo"] })),
            "2024-01-02T00:00:00.000Z",
            "2024-01-02T00:00:00.000Z",
        ),
        item(
            "3",
            "Test Data",
            "Test data for validation purposes",
            "test",
            None,
            "2024-01-03T00:00:00.000Z",
            "2024-01-03T00:00:00.000Z",
        ),
    ]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupArgs {
    pub limit: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    #[serde(default)]
    pub include_metadata: bool,
    #[serde(default)]
    pub output_mode: OutputMode,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupResult {
    pub items: Vec<Item>,
    /// Matches before `limit` was applied
    pub total_found: usize,
    pub query: LookupArgs,
}

/// Filter, truncate and optionally annotate `items`. Never modifies `items`.
pub fn lookup(items: &[Item], args: &LookupArgs, processed_at: &str) -> LookupResult {
    let needle = args
        .filter
        .as_deref()
        .filter(|f| !f.is_empty())
        .map(str::to_lowercase);

    let matching: Vec<&Item> = items
        .iter()
        .filter(|item| needle.as_deref().is_none_or(|n| item.matches(n)))
        .collect();
    let total_found = matching.len();

    let items = matching
        .into_iter()
        .take(args.limit)
        .map(|item| {
            if args.include_metadata {
                item.with_processing_metadata(processed_at)
            } else {
                item.clone()
            }
        })
        .collect();

    LookupResult {
        items,
        total_found,
        query: args.clone(),
    }
}

#[derive(Debug, Deserialize)]
struct DataLookupSettings {
    #[serde(default = "default_delay_ms")]
    delay_ms: u64,
}

fn default_delay_ms() -> u64 {
    100
}

pub struct DataLookupTool {
    /// Simulated I/O latency before results are returned
    delay: Duration,
}

impl DataLookupTool {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn from_settings(settings: &ToolSettings) -> Result<Self, ConfigError> {
        let s: DataLookupSettings = settings.for_tool(ToolId::DataLookup)?;
        Ok(Self::new(Duration::from_millis(s.delay_ms)))
    }
}

#[async_trait]
impl Tool for DataLookupTool {
    fn id(&self) -> ToolId {
        ToolId::DataLookup
    }

    fn description(&self) -> &'static str {
        "Look up example data with optional filtering and formatting"
    }

    fn parameters(&self) -> ParameterSchema {
        ParameterSchema::new()
            .param(
                Param::integer("limit", "Maximum number of results to return")
                    .range(1, 100)
                    .default(10),
            )
            .param(
                Param::string("filter", "Case-insensitive text matched against title, description and category")
                    .optional(),
            )
            .param(Param::boolean("includeMetadata", "Include processing metadata in each item").default(false))
            .param(Param::one_of("outputMode", OUTPUT_MODES, "Output format for the response").default("json"))
    }

    async fn call(&self, args: Arguments) -> Result<String, ToolError> {
        let args: LookupArgs = parse_args(args)?;

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let processed_at = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        let result = lookup(&fixture_items(), &args, &processed_at);
        tracing::debug!(
            total_found = result.total_found,
            returned = result.items.len(),
            "data lookup complete"
        );

        Ok(format_response(&result, args.output_mode)?)
    }
}
