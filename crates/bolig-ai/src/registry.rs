//! Tool registry: the fixed set of tools the model may call.
//!
//! Execution never propagates an error. Unknown tools, invalid parameters,
//! and API failures all come back as error-carrying [`ToolCallResponse`]s
//! that are fed to the model, which can adapt and try again.

use crate::tools::dst::{DstClient, DstTool};
use crate::tools::{validate_params, ToolCallRequest, ToolCallResponse, ToolDefinition};

pub struct ToolRegistry {
    dst: DstClient,
    tools: Vec<(ToolDefinition, DstTool)>,
}

impl ToolRegistry {
    /// Registers the four statbank tools against the given client.
    #[must_use]
    pub fn new(dst: DstClient) -> Self {
        let tools = DstTool::ALL
            .iter()
            .map(|tool| (tool.definition(), *tool))
            .collect::<Vec<_>>();
        tracing::info!(
            tools = ?tools.iter().map(|(def, _)| def.name.as_str()).collect::<Vec<_>>(),
            "registered analysis tools"
        );
        Self { dst, tools }
    }

    /// The definitions advertised to the model on every request.
    #[must_use]
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(|(def, _)| def.clone()).collect()
    }

    /// Executes one requested tool call.
    pub async fn execute(&self, request: &ToolCallRequest) -> ToolCallResponse {
        let name = request.tool_name.as_str();

        let Some((definition, tool)) = self.tools.iter().find(|(def, _)| def.name == name) else {
            tracing::warn!(tool = name, "model requested an unknown tool");
            return ToolCallResponse::err(name, format!("Tool '{name}' not found."));
        };

        if let Err(reason) = validate_params(&definition.input_schema, &request.parameters) {
            tracing::warn!(tool = name, reason, "tool parameter validation failed");
            return ToolCallResponse::err(name, format!("Parameter validation failed: {reason}"));
        }

        let result = tool.execute(&self.dst, &request.parameters).await;
        tracing::debug!(tool = name, bytes = result.len(), "tool executed");
        ToolCallResponse::ok(name, result)
    }
}
