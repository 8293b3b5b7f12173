//! The tool-calling analysis loop.
//!
//! One conversation per listing: the rendered prompt goes in as a single
//! user turn, then the loop alternates model responses and tool-result
//! turns until the model stops requesting tools. The accumulated text is
//! then mined for the JSON report and validated against the typed result
//! shape.

use bolig_core::AnalysisResult;

use crate::client::ClaudeClient;
use crate::error::AiError;
use crate::prompt::analysis_prompt;
use crate::registry::ToolRegistry;
use crate::tools::ToolCallRequest;
use crate::types::{ContentBlock, MessageParam};

pub struct AiAnalyzer {
    client: ClaudeClient,
    registry: ToolRegistry,
}

impl AiAnalyzer {
    #[must_use]
    pub fn new(client: ClaudeClient, registry: ToolRegistry) -> Self {
        Self { client, registry }
    }

    /// Analyzes one blob of listing text into the structured report.
    ///
    /// Returns the raw JSON value (which is what gets persisted) after it
    /// has passed validation against [`AnalysisResult`].
    ///
    /// # Errors
    ///
    /// - [`AiError::EmptyInput`] when `text` is blank.
    /// - [`AiError::NoFinalText`] when the conversation ends with no text.
    /// - [`AiError::MissingJson`] / [`AiError::InvalidJson`] /
    ///   [`AiError::ResultValidation`] when the final text is unusable.
    /// - Transport errors from [`ClaudeClient::create_message`].
    pub async fn analyze_text(&self, text: &str) -> Result<serde_json::Value, AiError> {
        if text.trim().is_empty() {
            return Err(AiError::EmptyInput);
        }
        tracing::info!(chars = text.len(), "starting AI analysis");
        let prompt = analysis_prompt(text);
        self.run_tool_loop(prompt).await
    }

    async fn run_tool_loop(&self, prompt: String) -> Result<serde_json::Value, AiError> {
        let tools = self.registry.definitions();
        let mut messages = vec![MessageParam::user(vec![ContentBlock::text(prompt)])];
        let mut final_text = String::new();

        loop {
            tracing::debug!(turns = messages.len(), "calling Claude API");
            let response = self.client.create_message(&messages, &tools).await?;

            messages.push(MessageParam::assistant(response.content.clone()));

            let mut tool_results: Vec<ContentBlock> = Vec::new();
            for block in &response.content {
                match block {
                    ContentBlock::Text { text } => final_text.push_str(text),
                    ContentBlock::ToolUse { id, name, input } => {
                        tracing::info!(tool = %name, tool_use_id = %id, "model requested tool call");
                        let outcome = self
                            .registry
                            .execute(&ToolCallRequest {
                                tool_name: name.clone(),
                                parameters: input.clone(),
                            })
                            .await;
                        let (content, is_error) = match (outcome.result, outcome.error) {
                            (Some(result), _) => (result, None),
                            (None, Some(error)) => (
                                serde_json::json!({ "error": error }).to_string(),
                                Some(true),
                            ),
                            (None, None) => (
                                serde_json::json!({ "error": "tool produced no output" })
                                    .to_string(),
                                Some(true),
                            ),
                        };
                        tool_results.push(ContentBlock::ToolResult {
                            tool_use_id: id.clone(),
                            content,
                            is_error,
                        });
                    }
                    ContentBlock::ToolResult { .. } => {}
                }
            }

            if tool_results.is_empty() {
                break;
            }
            messages.push(MessageParam::user(tool_results));
        }

        // A conversation of nothing but tool calls can leave the buffer
        // empty; scan the last assistant turn once more before giving up.
        if final_text.is_empty() {
            if let Some(last) = messages.iter().rev().find(|m| {
                matches!(m.role, crate::types::Role::Assistant)
            }) {
                for block in &last.content {
                    if let ContentBlock::Text { text } = block {
                        final_text.push_str(text);
                    }
                }
            }
        }
        if final_text.is_empty() {
            return Err(AiError::NoFinalText);
        }

        let value = extract_json(&final_text)?;
        validate_result(&value)?;
        Ok(value)
    }
}

/// Combines primary and secondary listing text into one analysis payload.
///
/// Sections are labelled only when both sources exist; with no secondary
/// text the primary passes through untouched.
#[must_use]
pub fn combine_texts(primary: &str, secondary: Option<&str>) -> String {
    match secondary {
        Some(secondary) if !secondary.trim().is_empty() => {
            format!("PRIMARY SOURCE:\n{primary}\n\nSECONDARY SOURCE:\n{secondary}")
        }
        _ => primary.to_owned(),
    }
}

/// Extracts the JSON object from the model's final text.
///
/// First attempt: the span from the first `{` to the last `}`. Fallback:
/// the same search constrained to after a ```` ```json ```` fence. The
/// model is instructed to emit pure JSON, but leading commentary and code
/// fences must not break extraction.
fn extract_json(raw: &str) -> Result<serde_json::Value, AiError> {
    if let (Some(start), Some(end)) = (raw.find('{'), raw.rfind('}')) {
        if start < end {
            match serde_json::from_str(&raw[start..=end]) {
                Ok(value) => return Ok(value),
                Err(error) => {
                    tracing::warn!(error = %error, "first-brace JSON extraction failed");
                    if let Some(value) = extract_json_from_fence(raw) {
                        return Ok(value);
                    }
                    return Err(AiError::InvalidJson(error));
                }
            }
        }
    }

    extract_json_from_fence(raw).ok_or(AiError::MissingJson)
}

fn extract_json_from_fence(raw: &str) -> Option<serde_json::Value> {
    let fence = raw.find("```json")?;
    let start = raw[fence..].find('{')? + fence;
    let end = raw.rfind('}')?;
    if start >= end {
        return None;
    }
    serde_json::from_str(&raw[start..=end]).ok()
}

/// Validates the extracted JSON against the typed report shape.
fn validate_result(value: &serde_json::Value) -> Result<(), AiError> {
    serde_json::from_value::<AnalysisResult>(value.clone())
        .map(|_| ())
        .map_err(AiError::ResultValidation)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
