use thiserror::Error;

/// Errors raised by the AI analysis pipeline.
#[derive(Debug, Error)]
pub enum AiError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The Claude API returned 429 and retries were exhausted.
    #[error("AI service rate limit exceeded after multiple retries")]
    RateLimited,

    /// Any other non-2xx response from the Claude API.
    #[error("unexpected HTTP status {status} from the Claude API: {body}")]
    UnexpectedStatus { status: u16, body: String },

    /// The conversation terminated without the model ever producing text.
    #[error("AI analysis completed without providing a final text response")]
    NoFinalText,

    /// No JSON object could be located in the model's final text.
    #[error("AI response did not contain a valid JSON object")]
    MissingJson,

    /// A JSON object was located but did not parse.
    #[error("AI response was not valid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),

    /// The parsed JSON does not match the expected result shape.
    #[error("AI response failed result validation: {0}")]
    ResultValidation(#[source] serde_json::Error),

    /// The combined listing text was empty, so there is nothing to analyze.
    #[error("no text content provided for analysis")]
    EmptyInput,
}
