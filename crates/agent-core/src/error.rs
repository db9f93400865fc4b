//! Error Types

use thiserror::Error;

/// Result type alias for agent operations
pub type Result<T> = std::result::Result<T, AgentError>;

/// Agent error types
///
/// Every variant aborts the turn it occurs in. Nothing is retried.
#[derive(Error, Debug)]
pub enum AgentError {
    /// LLM or embedding provider error
    #[error("Provider error: {0}")]
    Provider(String),

    /// Provider unavailable or not responding
    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// Authentication failed
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Rate limited
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// The model selected a tool the toolset does not declare
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// Tool arguments do not match the declared schema
    #[error("Invalid arguments for tool '{tool}': {reason}")]
    ToolArguments { tool: String, reason: String },

    /// Tool execution failed
    #[error("Tool execution error: {0}")]
    ToolExecution(String),

    /// A forced tool-choice completion came back without a tool call
    #[error("Model response contained no tool call")]
    MissingToolCall,

    /// The final completion came back without text
    #[error("Model response contained no content")]
    EmptyResponse,

    /// Parse error (e.g., tool call arguments)
    #[error("Parse error: {0}")]
    Parse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Other/unknown error
    #[error("{0}")]
    Other(String),
}

impl AgentError {
    /// Convert to a user-friendly message
    pub fn user_message(&self) -> String {
        match self {
            AgentError::Provider(_) => "The AI service encountered an error.".into(),
            AgentError::ProviderUnavailable(_) => "The AI service is currently unavailable. Please try again.".into(),
            AgentError::Auth(_) => "Authentication failed. Please check your credentials.".into(),
            AgentError::RateLimited(_) => "You've made too many requests. Please wait a moment.".into(),
            AgentError::UnknownTool(name) => format!("The tool '{}' is not available.", name),
            AgentError::ToolArguments { tool, .. } => format!("The assistant sent invalid input to '{}'.", tool),
            AgentError::ToolExecution(_) => "A lookup failed while answering your message.".into(),
            _ => "Something went wrong while answering your message.".into(),
        }
    }
}

impl From<anyhow::Error> for AgentError {
    fn from(err: anyhow::Error) -> Self {
        AgentError::Other(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_hides_internals() {
        let err = AgentError::ToolExecution("connection reset by 10.0.0.4".into());
        assert!(!err.user_message().contains("10.0.0.4"));

        let err = AgentError::Provider(r#"400 Bad Request: {"error":"org-internal-id-42"}"#.into());
        assert_eq!(err.user_message(), "The AI service encountered an error.");

        let err = AgentError::UnknownTool("stock_quote".into());
        assert_eq!(err.to_string(), "Unknown tool: stock_quote");
    }
}
