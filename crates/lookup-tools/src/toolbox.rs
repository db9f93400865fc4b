//! Lookup Toolbox
//!
//! Routes a decoded capability to exactly one lookup service.

use std::sync::Arc;

use agent_core::{ToolCall, ToolResult, ToolSchema, Toolset};
use async_trait::async_trait;

use crate::capability::{self, Capability};
use crate::error::Result;
use crate::service::{DocumentLookup, WeatherLookup, WebLookup};

/// Dispatcher over the three lookup services
pub struct LookupToolbox {
    documents: Arc<dyn DocumentLookup>,
    web: Arc<dyn WebLookup>,
    weather: Arc<dyn WeatherLookup>,
}

impl LookupToolbox {
    pub fn new(
        documents: Arc<dyn DocumentLookup>,
        web: Arc<dyn WebLookup>,
        weather: Arc<dyn WeatherLookup>,
    ) -> Self {
        Self {
            documents,
            web,
            weather,
        }
    }

    /// Run one capability and return its output as text
    pub async fn run(&self, capability: &Capability) -> Result<String> {
        match capability {
            Capability::DocumentSearch(args) => self.documents.search(&args.query).await,
            Capability::WebSearch(args) => self.web.search(&args.query).await,
            Capability::GetWeather(at) => self
                .weather
                .current_temperature(at.latitude, at.longitude)
                .await
                .map(|t| t.to_string()),
        }
    }
}

#[async_trait]
impl Toolset for LookupToolbox {
    fn schemas(&self) -> Vec<ToolSchema> {
        capability::descriptors()
    }

    async fn dispatch(&self, call: &ToolCall) -> agent_core::Result<ToolResult> {
        let capability = Capability::from_call(call)?;
        tracing::info!(tool = capability.name(), id = %call.id, "Running lookup");

        let output = self.run(&capability).await?;
        Ok(ToolResult::new(call, output))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agent_core::AgentError;
    use serde_json::{json, Number};

    use crate::service::MockLookups;

    fn toolbox(lookups: &Arc<MockLookups>) -> LookupToolbox {
        LookupToolbox::new(lookups.clone(), lookups.clone(), lookups.clone())
    }

    #[tokio::test]
    async fn test_each_name_hits_only_its_lookup() {
        let cases = [
            ("document_search", json!({"query": "invoice policy"})),
            ("web_search", json!({"query": "rust"})),
            ("get_weather", json!({"latitude": 52.5, "longitude": 13.4})),
        ];

        for (name, args) in cases {
            let lookups = Arc::new(MockLookups::new());
            let call = ToolCall::new("call_1", name, args.to_string());

            let result = toolbox(&lookups).dispatch(&call).await.unwrap();
            assert_eq!(result.id, "call_1");
            assert_eq!(result.name, name);
            assert_eq!(lookups.calls(), vec![name]);
        }
    }

    #[tokio::test]
    async fn test_weather_output_is_number_text() {
        let lookups = Arc::new(MockLookups::new().with_temperature(Number::from_f64(-3.5).unwrap()));
        let call = ToolCall::new("c", "get_weather", r#"{"latitude":0,"longitude":0}"#);

        let result = toolbox(&lookups).dispatch(&call).await.unwrap();
        assert_eq!(result.output, "-3.5");
    }

    #[tokio::test]
    async fn test_unknown_name_fails_without_lookup() {
        let lookups = Arc::new(MockLookups::new());
        let call = ToolCall::new("c", "stock_quote", r#"{"symbol":"MSFT"}"#);

        let err = toolbox(&lookups).dispatch(&call).await.unwrap_err();
        assert!(matches!(err, AgentError::UnknownTool(name) if name == "stock_quote"));
        assert!(lookups.calls().is_empty());
    }

    #[tokio::test]
    async fn test_bad_arguments_fail_without_lookup() {
        let lookups = Arc::new(MockLookups::new());
        let call = ToolCall::new("c", "web_search", r#"{"q":"rust"}"#);

        let err = toolbox(&lookups).dispatch(&call).await.unwrap_err();
        assert!(matches!(err, AgentError::ToolArguments { tool, .. } if tool == "web_search"));
        assert!(lookups.calls().is_empty());
    }

    #[tokio::test]
    async fn test_web_outage_still_answers() {
        use agent_core::mock::{MockProvider, MockResponse};
        use agent_core::{Agent, Role};
        use wiremock::{matchers::method, Mock, MockServer, ResponseTemplate};

        use crate::service::{BingConfig, BingWebSearch};

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let lookups = Arc::new(MockLookups::new());
        let web = Arc::new(BingWebSearch::new(BingConfig {
            endpoint: server.uri(),
            subscription_key: "k".into(),
        }));
        let provider = Arc::new(MockProvider::with_responses([
            MockResponse::tool_call("web_search", json!({"query": "latest news"})),
            MockResponse::text("Web search is unavailable right now (503)."),
        ]));
        let agent = Agent::builder()
            .provider(provider.clone())
            .tools(Arc::new(LookupToolbox::new(lookups.clone(), web, lookups.clone())))
            .build()
            .unwrap();

        let outcome = agent.respond("latest news").await.unwrap();
        assert!(outcome.answer.contains("503"));

        let tool_message = &provider.requests()[1].messages[3];
        assert_eq!(tool_message.role, Role::Tool);
        assert!(tool_message.content.contains("503"));
    }

    #[tokio::test]
    async fn test_weather_turn_sends_temperature_text() {
        use agent_core::mock::{MockProvider, MockResponse};
        use agent_core::Agent;

        let lookups = Arc::new(MockLookups::new().with_temperature(Number::from_f64(18.7).unwrap()));
        let provider = Arc::new(MockProvider::with_responses([
            MockResponse::tool_call("get_weather", json!({"latitude": 52.5, "longitude": 13.4})),
            MockResponse::text("It is 18.7°C."),
        ]));
        let agent = Agent::builder()
            .provider(provider.clone())
            .tools(Arc::new(toolbox(&lookups)))
            .build()
            .unwrap();

        agent.respond("Weather in Berlin?").await.unwrap();

        let second = &provider.requests()[1].messages;
        assert_eq!(second.len(), 4);
        assert_eq!(second[3].content, "18.7");
        assert_eq!(lookups.calls(), vec!["get_weather"]);
    }

    #[test]
    fn test_schemas_are_registry() {
        let lookups = Arc::new(MockLookups::new());
        assert_eq!(
            toolbox(&lookups).names(),
            vec!["document_search", "web_search", "get_weather"]
        );
    }
}
