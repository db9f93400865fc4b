//! Error Types for Lookup Tools

use agent_core::AgentError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, LookupError>;

#[derive(Error, Debug)]
pub enum LookupError {
    #[error("Unknown capability: {0}")]
    UnknownCapability(String),

    #[error("Invalid arguments for '{tool}': {reason}")]
    Arguments { tool: String, reason: String },

    #[error("Search index error: {0}")]
    Search(String),

    #[error("Weather service error: {0}")]
    Weather(String),

    #[error("Response is missing field '{0}'")]
    MissingField(&'static str),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Agent(#[from] AgentError),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<LookupError> for AgentError {
    fn from(err: LookupError) -> Self {
        match err {
            LookupError::UnknownCapability(name) => AgentError::UnknownTool(name),
            LookupError::Arguments { tool, reason } => AgentError::ToolArguments { tool, reason },
            LookupError::Config(msg) => AgentError::Config(msg),
            LookupError::Agent(inner) => inner,
            other => AgentError::ToolExecution(other.to_string()),
        }
    }
}
