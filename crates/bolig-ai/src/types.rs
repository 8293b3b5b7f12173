//! Wire types for the Claude Messages API.
//!
//! Only the slice of the API this service uses is modelled: text blocks,
//! tool invocations, and tool results. Everything else in a response is
//! ignored by serde.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One content block in a message, tagged by `type` on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text {
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
        input: serde_json::Value,
    },
    ToolResult {
        tool_use_id: String,
        content: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        is_error: Option<bool>,
    },
}

impl ContentBlock {
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    #[must_use]
    pub fn is_tool_use(&self) -> bool {
        matches!(self, Self::ToolUse { .. })
    }
}

/// One turn in the conversation transcript.
#[derive(Debug, Clone, Serialize)]
pub struct MessageParam {
    pub role: Role,
    pub content: Vec<ContentBlock>,
}

impl MessageParam {
    #[must_use]
    pub fn user(content: Vec<ContentBlock>) -> Self {
        Self {
            role: Role::User,
            content,
        }
    }

    #[must_use]
    pub fn assistant(content: Vec<ContentBlock>) -> Self {
        Self {
            role: Role::Assistant,
            content,
        }
    }
}

/// The model's reply to one `create message` call.
#[derive(Debug, Clone, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub content: Vec<ContentBlock>,
    #[serde(default)]
    pub stop_reason: Option<String>,
}

impl MessageResponse {
    /// `true` when the response asks for at least one tool execution.
    #[must_use]
    pub fn requests_tools(&self) -> bool {
        self.content.iter().any(ContentBlock::is_tool_use)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_blocks_deserialize_from_tagged_json() {
        let json = serde_json::json!([
            {"type": "text", "text": "Her er analysen"},
            {"type": "tool_use", "id": "tu_1", "name": "get_dst_subjects", "input": {}}
        ]);
        let blocks: Vec<ContentBlock> = serde_json::from_value(json).unwrap();
        assert_eq!(blocks.len(), 2);
        assert!(!blocks[0].is_tool_use());
        assert!(blocks[1].is_tool_use());
    }

    #[test]
    fn tool_result_omits_absent_error_flag() {
        let block = ContentBlock::ToolResult {
            tool_use_id: "tu_1".to_owned(),
            content: "{}".to_owned(),
            is_error: None,
        };
        let json = serde_json::to_value(&block).unwrap();
        assert!(json.get("is_error").is_none());
        assert_eq!(json["type"], "tool_result");
    }

    #[test]
    fn requests_tools_detects_tool_use_blocks() {
        let with_tools = MessageResponse {
            content: vec![
                ContentBlock::text("tænker..."),
                ContentBlock::ToolUse {
                    id: "tu_1".to_owned(),
                    name: "get_dst_tables".to_owned(),
                    input: serde_json::json!({"subjects": ["02"]}),
                },
            ],
            stop_reason: Some("tool_use".to_owned()),
        };
        assert!(with_tools.requests_tools());

        let text_only = MessageResponse {
            content: vec![ContentBlock::text("{\"summary\": \"...\"}")],
            stop_reason: Some("end_turn".to_owned()),
        };
        assert!(!text_only.requests_tools());
    }
}
