//! Tool-calling contract: definitions, requests, responses, and static
//! parameter validation.
//!
//! Definitions serialize to the JSON-schema-like shape the Claude API
//! expects for its `tools` parameter. Validation is a small static routine
//! over a tagged property-type enum, with no runtime model synthesis.

pub mod dst;

use std::collections::BTreeMap;

use serde::Serialize;

/// JSON type tag for one tool parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyKind {
    String,
    Integer,
    Number,
    Boolean,
    Array,
    Object,
}

impl PropertyKind {
    /// Whether a JSON value inhabits this type. Integers are acceptable
    /// numbers, but a fractional number is not an acceptable integer.
    #[must_use]
    pub fn accepts(self, value: &serde_json::Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Integer => value.is_i64() || value.is_u64(),
            Self::Number => value.is_number(),
            Self::Boolean => value.is_boolean(),
            Self::Array => value.is_array(),
            Self::Object => value.is_object(),
        }
    }
}

/// One named parameter in a tool's input schema.
#[derive(Debug, Clone, Serialize)]
pub struct ToolProperty {
    #[serde(rename = "type")]
    pub kind: PropertyKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Allowed values, when the parameter is an enumeration.
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub allowed: Option<Vec<serde_json::Value>>,
    /// Element schema for array parameters, passed through untyped.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<serde_json::Value>,
}

impl ToolProperty {
    #[must_use]
    pub fn new(kind: PropertyKind, description: &str) -> Self {
        Self {
            kind,
            description: Some(description.to_owned()),
            allowed: None,
            items: None,
        }
    }

    #[must_use]
    pub fn with_items(mut self, items: serde_json::Value) -> Self {
        self.items = Some(items);
        self
    }

    #[must_use]
    pub fn with_allowed(mut self, allowed: Vec<serde_json::Value>) -> Self {
        self.allowed = Some(allowed);
        self
    }
}

/// Input schema of a tool; always a JSON object schema.
#[derive(Debug, Clone, Serialize)]
pub struct ToolInputSchema {
    #[serde(rename = "type")]
    kind: &'static str,
    pub properties: BTreeMap<String, ToolProperty>,
    pub required: Vec<String>,
}

impl ToolInputSchema {
    #[must_use]
    pub fn new(properties: BTreeMap<String, ToolProperty>, required: Vec<String>) -> Self {
        Self {
            kind: "object",
            properties,
            required,
        }
    }
}

/// A tool the model may call mid-conversation.
#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: ToolInputSchema,
}

/// The model's request to execute one tool.
#[derive(Debug, Clone)]
pub struct ToolCallRequest {
    pub tool_name: String,
    pub parameters: serde_json::Value,
}

/// Outcome of one tool execution; exactly one of `result`/`error` is set.
#[derive(Debug, Clone)]
pub struct ToolCallResponse {
    pub tool_name: String,
    pub result: Option<String>,
    pub error: Option<String>,
}

impl ToolCallResponse {
    #[must_use]
    pub fn ok(tool_name: &str, result: String) -> Self {
        Self {
            tool_name: tool_name.to_owned(),
            result: Some(result),
            error: None,
        }
    }

    #[must_use]
    pub fn err(tool_name: &str, error: String) -> Self {
        Self {
            tool_name: tool_name.to_owned(),
            result: None,
            error: Some(error),
        }
    }
}

/// Checks `params` against a tool's declared schema.
///
/// Verifies that the parameters form an object, that every required key is
/// present, and that every supplied key with a declared schema has the
/// right JSON type and (where declared) an allowed enum value. Undeclared
/// extra keys pass through untouched.
///
/// # Errors
///
/// Returns a human-readable description of the first violation found.
pub fn validate_params(
    schema: &ToolInputSchema,
    params: &serde_json::Value,
) -> Result<(), String> {
    let Some(map) = params.as_object() else {
        return Err("parameters must be a JSON object".to_owned());
    };

    for required in &schema.required {
        if !map.contains_key(required) {
            return Err(format!("missing required parameter: {required}"));
        }
    }

    for (name, value) in map {
        let Some(property) = schema.properties.get(name) else {
            continue;
        };
        if value.is_null() {
            if schema.required.contains(name) {
                return Err(format!("required parameter {name} must not be null"));
            }
            continue;
        }
        if !property.kind.accepts(value) {
            return Err(format!(
                "parameter {name} has the wrong type (expected {:?})",
                property.kind
            ));
        }
        if let Some(allowed) = &property.allowed {
            if !allowed.contains(value) {
                return Err(format!("parameter {name} is not one of the allowed values"));
            }
        }
    }

    Ok(())
}
