//! Tool System
//!
//! Tool descriptors, tool-call requests from the model, tool results, and the
//! `Toolset` seam the orchestrator dispatches through. The set of tools behind
//! a `Toolset` is fixed when it is constructed.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::error::{AgentError, Result};

/// Tool call request from the LLM
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Correlation ID assigned by the model
    pub id: String,

    /// Tool identifier
    pub name: String,

    /// Arguments exactly as the model encoded them (a JSON document)
    pub arguments: String,
}

impl ToolCall {
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments: arguments.into(),
        }
    }

    /// Parse the argument payload as structured data
    pub fn parsed_arguments(&self) -> Result<Value> {
        serde_json::from_str(&self.arguments).map_err(|e| {
            AgentError::Parse(format!("arguments for '{}' are not valid JSON: {}", self.name, e))
        })
    }
}

/// Result from tool execution
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolResult {
    /// Tool that was called
    pub name: String,

    /// Correlation ID of the invocation this answers
    pub id: String,

    /// Serialized adapter output
    pub output: String,
}

impl ToolResult {
    pub fn new(call: &ToolCall, output: impl Into<String>) -> Self {
        Self {
            name: call.name.clone(),
            id: call.id.clone(),
            output: output.into(),
        }
    }
}

/// Parameter definition for tool schema
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ParameterSchema {
    /// Parameter name
    pub name: String,

    /// JSON Schema type (string, number, boolean, object, array)
    #[serde(rename = "type")]
    pub param_type: String,

    /// Human-readable description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Whether this parameter is required
    #[serde(default)]
    pub required: bool,
}

impl ParameterSchema {
    pub fn required(name: impl Into<String>, param_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            param_type: param_type.into(),
            description: None,
            required: true,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Tool descriptor (for LLM function calling)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolSchema {
    /// Unique tool identifier
    pub name: String,

    /// Human-readable description (shown to LLM)
    pub description: String,

    /// Parameter definitions
    pub parameters: Vec<ParameterSchema>,

    /// Whether the provider should enforce the schema strictly
    #[serde(default)]
    pub strict: bool,
}

impl ToolSchema {
    /// Render the parameters as a JSON Schema object
    ///
    /// Unknown properties are rejected (`additionalProperties: false`).
    pub fn parameters_json(&self) -> Value {
        let mut properties = Map::new();
        for param in &self.parameters {
            let mut prop = Map::new();
            prop.insert("type".into(), Value::String(param.param_type.clone()));
            if let Some(description) = &param.description {
                prop.insert("description".into(), Value::String(description.clone()));
            }
            properties.insert(param.name.clone(), Value::Object(prop));
        }

        let required: Vec<&str> = self
            .parameters
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name.as_str())
            .collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
            "additionalProperties": false,
        })
    }
}

/// Record of the tool the orchestrator dispatched in a turn
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToolTrace {
    /// Dispatched tool name
    pub tool: String,

    /// Parsed arguments
    pub arguments: Value,
}

impl std::fmt::Display for ToolTrace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Last executed function: {} {}", self.tool, self.arguments)
    }
}

/// Tool registry and dispatcher seam
///
/// `schemas` is read-only at request time. `dispatch` routes exactly one call
/// to the matching tool and fails with `AgentError::UnknownTool` for any name
/// it does not declare.
#[async_trait]
pub trait Toolset: Send + Sync {
    /// Descriptors for every tool in the set
    fn schemas(&self) -> Vec<ToolSchema>;

    /// Execute a single tool call
    async fn dispatch(&self, call: &ToolCall) -> Result<ToolResult>;

    /// Tool names, in declaration order
    fn names(&self) -> Vec<String> {
        self.schemas().into_iter().map(|s| s.name).collect()
    }
}

/// Observer notified after each dispatch (the trace sidebar)
pub trait TraceSink: Send + Sync {
    fn record(&self, trace: &ToolTrace);
}

/// Writes traces to the log
#[derive(Clone, Copy, Debug, Default)]
pub struct LogTraceSink;

impl TraceSink for LogTraceSink {
    fn record(&self, trace: &ToolTrace) {
        tracing::info!(tool = %trace.tool, arguments = %trace.arguments, "Tool executed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameters_json() {
        let schema = ToolSchema {
            name: "get_weather".into(),
            description: "Get current temperature for a given location.".into(),
            parameters: vec![
                ParameterSchema::required("latitude", "number"),
                ParameterSchema::required("longitude", "number"),
            ],
            strict: false,
        };

        let params = schema.parameters_json();
        assert_eq!(params["type"], "object");
        assert_eq!(params["properties"]["latitude"]["type"], "number");
        assert_eq!(params["required"], json!(["latitude", "longitude"]));
        assert_eq!(params["additionalProperties"], false);
        assert!(params["properties"]["latitude"].get("description").is_none());
    }

    #[test]
    fn test_parsed_arguments() {
        let call = ToolCall::new("call_1", "web_search", r#"{"query": "rust 2024"}"#);
        assert_eq!(call.parsed_arguments().unwrap()["query"], "rust 2024");

        let broken = ToolCall::new("call_2", "web_search", "{query:");
        assert!(matches!(broken.parsed_arguments(), Err(AgentError::Parse(_))));
    }

    #[test]
    fn test_trace_display() {
        let trace = ToolTrace {
            tool: "web_search".into(),
            arguments: json!({"query": "rust"}),
        };
        assert_eq!(
            trace.to_string(),
            r#"Last executed function: web_search {"query":"rust"}"#
        );
    }
}
