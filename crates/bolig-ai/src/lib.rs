pub mod analyzer;
pub mod client;
pub mod error;
pub mod prompt;
pub mod registry;
pub mod tools;
pub mod types;

pub use analyzer::{combine_texts, AiAnalyzer};
pub use client::{ClaudeClient, ClaudeConfig};
pub use error::AiError;
pub use registry::ToolRegistry;
pub use tools::dst::{DstClient, DstTool};
pub use tools::{
    validate_params, PropertyKind, ToolCallRequest, ToolCallResponse, ToolDefinition,
    ToolInputSchema, ToolProperty,
};
pub use types::{ContentBlock, MessageParam, MessageResponse, Role};
