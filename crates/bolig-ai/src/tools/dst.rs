//! Danmarks Statistik (statbank) lookup tools.
//!
//! Four tools mirror the statbank API's drill-down: subjects → tables →
//! table metadata → data. Each execution returns the raw response text so
//! the model can read it directly; HTTP and status failures are folded
//! into a JSON error envelope string instead of propagating, because one failed
//! lookup must never abort the conversation.

use std::collections::BTreeMap;
use std::time::Duration;

use serde_json::{json, Value};

use super::{PropertyKind, ToolDefinition, ToolInputSchema, ToolProperty};

const DEFAULT_BASE_URL: &str = "https://api.statbank.dk/v1";
const REQUEST_TIMEOUT_SECS: u64 = 60;

/// Client for the statbank REST API.
#[derive(Debug, Clone)]
pub struct DstClient {
    client: reqwest::Client,
    base_url: String,
}

impl DstClient {
    /// Creates a client pointed at the production statbank API.
    ///
    /// # Errors
    ///
    /// Returns [`reqwest::Error`] if the underlying client cannot be built.
    pub fn new() -> Result<Self, reqwest::Error> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`reqwest::Error`] if the underlying client cannot be built.
    pub fn with_base_url(base_url: &str) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
        })
    }

    /// POSTs a JSON payload to a statbank endpoint and returns the raw
    /// response text. Failures become JSON error envelope strings.
    async fn post(&self, endpoint: &str, payload: &Value) -> String {
        let url = format!("{}/{endpoint}", self.base_url);
        let response = match self.client.post(&url).json(payload).send().await {
            Ok(response) => response,
            Err(error) => {
                tracing::warn!(endpoint, error = %error, "DST API request failed");
                return json!({ "error": format!("DST API request failed: {error}") }).to_string();
            }
        };

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            tracing::warn!(endpoint, status = status.as_u16(), "DST API error status");
            return json!({
                "error": format!("DST API request failed: {}", status.as_u16()),
                "details": body,
            })
            .to_string();
        }

        body
    }
}

/// The fixed set of statbank tools exposed to the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DstTool {
    Subjects,
    Tables,
    TableInfo,
    Data,
}

impl DstTool {
    /// All tools, in the order they are registered.
    pub const ALL: [Self; 4] = [Self::Subjects, Self::Tables, Self::TableInfo, Self::Data];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Subjects => "get_dst_subjects",
            Self::Tables => "get_dst_tables",
            Self::TableInfo => "get_dst_table_info",
            Self::Data => "get_dst_data",
        }
    }

    /// The schema advertised to the model for this tool.
    #[must_use]
    pub fn definition(self) -> ToolDefinition {
        match self {
            Self::Subjects => subjects_definition(),
            Self::Tables => tables_definition(),
            Self::TableInfo => table_info_definition(),
            Self::Data => data_definition(),
        }
    }

    /// Executes the tool against the statbank API with validated params.
    ///
    /// Always returns a string: either the raw API response or a JSON
    /// error envelope.
    pub async fn execute(self, client: &DstClient, params: &Value) -> String {
        match self {
            Self::Subjects => {
                let payload = prune_nulls(json!({
                    "subjects": params.get("subjects"),
                    "recursive": params.get("recursive").cloned().unwrap_or(json!(false)),
                    "lang": lang_or_default(params),
                    "format": "JSON",
                }));
                client.post("subjects", &payload).await
            }
            Self::Tables => {
                let payload = prune_nulls(json!({
                    "subjects": params.get("subjects"),
                    "pastDays": params.get("pastDays"),
                    "includeInactive": params.get("includeInactive").cloned().unwrap_or(json!(false)),
                    "lang": lang_or_default(params),
                    "format": "JSON",
                }));
                client.post("tables", &payload).await
            }
            Self::TableInfo => {
                let payload = json!({
                    "table": params.get("tableId"),
                    "lang": lang_or_default(params),
                    "format": "JSON",
                });
                client.post("tableinfo", &payload).await
            }
            Self::Data => {
                let payload = json!({
                    "table": params.get("tableId"),
                    "format": params.get("format").cloned().unwrap_or(json!("JSONSTAT")),
                    "lang": lang_or_default(params),
                    "variables": params.get("variables"),
                });
                client.post("data", &payload).await
            }
        }
    }
}

fn lang_or_default(params: &Value) -> Value {
    params.get("lang").cloned().unwrap_or(json!("en"))
}

/// Drops top-level null entries so optional parameters the model omitted
/// are not sent as explicit nulls.
fn prune_nulls(mut payload: Value) -> Value {
    if let Some(map) = payload.as_object_mut() {
        map.retain(|_, value| !value.is_null());
    }
    payload
}

fn lang_property() -> ToolProperty {
    ToolProperty::new(
        PropertyKind::String,
        "Language for the response (e.g., 'en', 'da'). Defaults to 'en'.",
    )
}

fn subjects_definition() -> ToolDefinition {
    let mut properties = BTreeMap::new();
    properties.insert(
        "subjects".to_owned(),
        ToolProperty::new(
            PropertyKind::Array,
            "Optional list of parent subject IDs to retrieve children for. \
             If omitted, retrieves root subjects.",
        )
        .with_items(json!({"type": "string"})),
    );
    properties.insert(
        "recursive".to_owned(),
        ToolProperty::new(
            PropertyKind::Boolean,
            "If true, retrieves all descendants recursively. Defaults to false.",
        ),
    );
    properties.insert("lang".to_owned(), lang_property());

    ToolDefinition {
        name: DstTool::Subjects.name().to_owned(),
        description: "Retrieves subjects (categories) from the Danmarks Statistik (DST) API. \
                      Subjects can be hierarchical."
            .to_owned(),
        input_schema: ToolInputSchema::new(properties, vec![]),
    }
}

fn tables_definition() -> ToolDefinition {
    let mut properties = BTreeMap::new();
    properties.insert(
        "subjects".to_owned(),
        ToolProperty::new(
            PropertyKind::Array,
            "Optional list of subject IDs to filter tables by. \
             If omitted, retrieves tables from all subjects.",
        )
        .with_items(json!({"type": "string"})),
    );
    properties.insert(
        "pastDays".to_owned(),
        ToolProperty::new(
            PropertyKind::Integer,
            "Optional number of days to look back for updated tables.",
        ),
    );
    properties.insert(
        "includeInactive".to_owned(),
        ToolProperty::new(
            PropertyKind::Boolean,
            "If true, includes inactive tables in the result. Defaults to false.",
        ),
    );
    properties.insert("lang".to_owned(), lang_property());

    ToolDefinition {
        name: DstTool::Tables.name().to_owned(),
        description: "Retrieves a list of tables from the Danmarks Statistik (DST) API, \
                      optionally filtered by subject and update recency."
            .to_owned(),
        input_schema: ToolInputSchema::new(properties, vec![]),
    }
}

fn table_info_definition() -> ToolDefinition {
    let mut properties = BTreeMap::new();
    properties.insert(
        "tableId".to_owned(),
        ToolProperty::new(
            PropertyKind::String,
            "The ID of the table to retrieve information for.",
        ),
    );
    properties.insert("lang".to_owned(), lang_property());

    ToolDefinition {
        name: DstTool::TableInfo.name().to_owned(),
        description: "Retrieves detailed metadata about a specific table from the Danmarks \
                      Statistik (DST) API, including variables, values, and time periods."
            .to_owned(),
        input_schema: ToolInputSchema::new(properties, vec!["tableId".to_owned()]),
    }
}

fn data_definition() -> ToolDefinition {
    let mut properties = BTreeMap::new();
    properties.insert(
        "tableId".to_owned(),
        ToolProperty::new(
            PropertyKind::String,
            "The ID of the table to retrieve data from.",
        ),
    );
    properties.insert("lang".to_owned(), lang_property());
    properties.insert(
        "format".to_owned(),
        ToolProperty::new(PropertyKind::String, "The desired format for the data response.")
            .with_allowed(vec![
                json!("CSV"),
                json!("XLSX"),
                json!("JSON"),
                json!("JSONSTAT"),
                json!("JSONSTAT2"),
            ]),
    );
    properties.insert(
        "variables".to_owned(),
        ToolProperty::new(
            PropertyKind::Array,
            "An array specifying the variables and their selected values to include in the \
             data retrieval. Use values ['*'] to select all values for a variable.",
        )
        .with_items(json!({
            "type": "object",
            "properties": {
                "code": {"type": "string", "description": "The code (ID) of the variable."},
                "values": {
                    "type": "array",
                    "description": "Specific values to retrieve; ['*'] selects all.",
                    "items": {"type": "string"}
                }
            },
            "required": ["code", "values"]
        })),
    );

    ToolDefinition {
        name: DstTool::Data.name().to_owned(),
        description: "Retrieves data from a specific table in the Danmarks Statistik (DST) \
                      API based on selected variables and values."
            .to_owned(),
        input_schema: ToolInputSchema::new(
            properties,
            vec!["tableId".to_owned(), "variables".to_owned()],
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_names_are_unique() {
        let mut names: Vec<&str> = DstTool::ALL.iter().map(|t| t.name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), DstTool::ALL.len());
    }

    #[test]
    fn data_definition_requires_table_and_variables() {
        let def = DstTool::Data.definition();
        assert_eq!(def.input_schema.required, vec!["tableId", "variables"]);
    }

    #[test]
    fn subjects_definition_has_no_required_params() {
        let def = DstTool::Subjects.definition();
        assert!(def.input_schema.required.is_empty());
    }

    #[test]
    fn prune_nulls_drops_omitted_optionals() {
        let pruned = prune_nulls(json!({"subjects": null, "lang": "en"}));
        assert!(pruned.get("subjects").is_none());
        assert_eq!(pruned["lang"], "en");
    }
}
