//! Capability Registry
//!
//! The closed set of lookups the model can choose from. Each variant carries
//! its own argument payload, and `descriptors` is the matching static tool
//! registry sent to the model.

use agent_core::{ParameterSchema, ToolCall, ToolSchema};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{LookupError, Result};

pub const DOCUMENT_SEARCH: &str = "document_search";
pub const WEB_SEARCH: &str = "web_search";
pub const GET_WEATHER: &str = "get_weather";

/// Arguments for the text-query lookups
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QueryArgs {
    pub query: String,
}

/// Arguments for the weather lookup
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// One selected lookup with its arguments
#[derive(Clone, Debug, PartialEq)]
pub enum Capability {
    DocumentSearch(QueryArgs),
    WebSearch(QueryArgs),
    GetWeather(Coordinates),
}

impl Capability {
    /// Decode a model tool call into a capability
    pub fn from_call(call: &ToolCall) -> Result<Self> {
        match call.name.as_str() {
            DOCUMENT_SEARCH => Ok(Self::DocumentSearch(arguments(call)?)),
            WEB_SEARCH => Ok(Self::WebSearch(arguments(call)?)),
            GET_WEATHER => Ok(Self::GetWeather(arguments(call)?)),
            other => Err(LookupError::UnknownCapability(other.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::DocumentSearch(_) => DOCUMENT_SEARCH,
            Self::WebSearch(_) => WEB_SEARCH,
            Self::GetWeather(_) => GET_WEATHER,
        }
    }
}

fn arguments<T: DeserializeOwned>(call: &ToolCall) -> Result<T> {
    serde_json::from_str(&call.arguments).map_err(|e| LookupError::Arguments {
        tool: call.name.clone(),
        reason: e.to_string(),
    })
}

/// Tool descriptors for every capability, in a fixed order
pub fn descriptors() -> Vec<ToolSchema> {
    vec![
        ToolSchema {
            name: DOCUMENT_SEARCH.into(),
            description: "Search for documents using Azure Cognitive Search.".into(),
            parameters: vec![ParameterSchema::required("query", "string").with_description("Search query.")],
            strict: false,
        },
        ToolSchema {
            name: WEB_SEARCH.into(),
            description: "Search the web using Bing Web Search.".into(),
            parameters: vec![ParameterSchema::required("query", "string").with_description("Search query.")],
            strict: false,
        },
        ToolSchema {
            name: GET_WEATHER.into(),
            description: "Get current temperature for a given location.".into(),
            parameters: vec![
                ParameterSchema::required("latitude", "number"),
                ParameterSchema::required("longitude", "number"),
            ],
            strict: false,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Map, Value};

    fn call(name: &str, arguments: Value) -> ToolCall {
        ToolCall::new("call_1", name, arguments.to_string())
    }

    #[test]
    fn test_decode_each_capability() {
        let docs = Capability::from_call(&call("document_search", json!({"query": "invoice policy"}))).unwrap();
        assert_eq!(docs, Capability::DocumentSearch(QueryArgs { query: "invoice policy".into() }));

        let web = Capability::from_call(&call("web_search", json!({"query": "rust 2024"}))).unwrap();
        assert_eq!(web.name(), "web_search");

        let weather = Capability::from_call(&call("get_weather", json!({"latitude": 52.5, "longitude": 13.4}))).unwrap();
        assert_eq!(weather, Capability::GetWeather(Coordinates { latitude: 52.5, longitude: 13.4 }));
    }

    #[test]
    fn test_unknown_capability() {
        let err = Capability::from_call(&call("stock_quote", json!({}))).unwrap_err();
        assert!(matches!(err, LookupError::UnknownCapability(name) if name == "stock_quote"));
    }

    #[test]
    fn test_argument_shape_errors() {
        let missing = Capability::from_call(&call("get_weather", json!({"latitude": 1.0}))).unwrap_err();
        assert!(matches!(missing, LookupError::Arguments { ref tool, .. } if tool == "get_weather"));

        let wrong_type = Capability::from_call(&call("web_search", json!({"query": 7}))).unwrap_err();
        assert!(matches!(wrong_type, LookupError::Arguments { .. }));
    }

    #[test]
    fn test_descriptors_match_decoder() {
        for schema in descriptors() {
            let mut args = Map::new();
            for param in &schema.parameters {
                let sample = match param.param_type.as_str() {
                    "number" => json!(1.5),
                    _ => json!("sample"),
                };
                args.insert(param.name.clone(), sample);
            }

            let decoded = Capability::from_call(&call(&schema.name, Value::Object(args))).unwrap();
            assert_eq!(decoded.name(), schema.name);
        }
    }

    #[test]
    fn test_descriptor_names_unique() {
        let mut names: Vec<String> = descriptors().into_iter().map(|s| s.name).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), 3);
    }
}
