//! Mock Provider and Toolset
//!
//! Scripted stand-ins for tests and offline demos. `MockProvider` replays
//! queued completions in order and records every request it receives.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::error::{AgentError, Result};
use crate::message::Message;
use crate::provider::{Completion, FinishReason, GenerationOptions, LlmProvider, ToolChoice};
use crate::tool::{ParameterSchema, ToolCall, ToolResult, ToolSchema, Toolset};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A scripted reply
#[derive(Debug)]
pub enum MockResponse {
    Completion(Completion),
    Error(AgentError),
}

impl MockResponse {
    /// Plain text answer
    pub fn text(content: impl Into<String>) -> Self {
        Self::Completion(Completion {
            content: Some(content.into()),
            model: "mock".into(),
            finish_reason: Some(FinishReason::Stop),
            ..Default::default()
        })
    }

    /// Tool-call answer with a fresh correlation ID
    pub fn tool_call(name: impl Into<String>, arguments: serde_json::Value) -> Self {
        let id = format!("call_{}", uuid::Uuid::new_v4().simple());
        Self::tool_calls(vec![ToolCall::new(id, name, arguments.to_string())])
    }

    /// Answer with several tool calls
    pub fn tool_calls(calls: Vec<ToolCall>) -> Self {
        Self::Completion(Completion {
            tool_calls: calls,
            model: "mock".into(),
            finish_reason: Some(FinishReason::ToolCalls),
            ..Default::default()
        })
    }

    pub fn error(error: AgentError) -> Self {
        Self::Error(error)
    }
}

/// A request as the provider saw it
#[derive(Clone, Debug)]
pub struct RecordedRequest {
    pub messages: Vec<Message>,
    pub tool_names: Vec<String>,
    pub tool_choice: ToolChoice,
    pub model: String,
}

/// Provider that replays scripted responses
#[derive(Default)]
pub struct MockProvider {
    responses: Mutex<VecDeque<MockResponse>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_responses(responses: impl IntoIterator<Item = MockResponse>) -> Self {
        let provider = Self::new();
        provider.add_responses(responses);
        provider
    }

    pub fn add_response(&self, response: MockResponse) {
        lock(&self.responses).push_back(response);
    }

    pub fn add_responses(&self, responses: impl IntoIterator<Item = MockResponse>) {
        lock(&self.responses).extend(responses);
    }

    pub fn remaining_responses(&self) -> usize {
        lock(&self.responses).len()
    }

    /// Every request received so far, oldest first
    pub fn requests(&self) -> Vec<RecordedRequest> {
        lock(&self.requests).clone()
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
    fn name(&self) -> &str {
        "Mock"
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    async fn complete(
        &self,
        messages: &[Message],
        tools: &[ToolSchema],
        tool_choice: ToolChoice,
        options: &GenerationOptions,
    ) -> Result<Completion> {
        lock(&self.requests).push(RecordedRequest {
            messages: messages.to_vec(),
            tool_names: tools.iter().map(|t| t.name.clone()).collect(),
            tool_choice,
            model: options.model.clone(),
        });

        match lock(&self.responses).pop_front() {
            Some(MockResponse::Completion(completion)) => Ok(completion),
            Some(MockResponse::Error(error)) => Err(error),
            None => Err(AgentError::Provider("no scripted response left".into())),
        }
    }
}

/// Toolset answering each declared tool with a fixed output
#[derive(Default)]
pub struct StaticToolset {
    outputs: Vec<(String, String)>,
    calls: Mutex<HashMap<String, usize>>,
}

impl StaticToolset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a tool taking a single `query` string
    pub fn with_tool(mut self, name: impl Into<String>, output: impl Into<String>) -> Self {
        self.outputs.push((name.into(), output.into()));
        self
    }

    /// How many times `name` was dispatched
    pub fn calls(&self, name: &str) -> usize {
        lock(&self.calls).get(name).copied().unwrap_or(0)
    }
}

#[async_trait]
impl Toolset for StaticToolset {
    fn schemas(&self) -> Vec<ToolSchema> {
        self.outputs
            .iter()
            .map(|(name, _)| ToolSchema {
                name: name.clone(),
                description: format!("Static tool {}", name),
                parameters: vec![ParameterSchema::required("query", "string")],
                strict: false,
            })
            .collect()
    }

    async fn dispatch(&self, call: &ToolCall) -> Result<ToolResult> {
        let (_, output) = self
            .outputs
            .iter()
            .find(|(name, _)| *name == call.name)
            .ok_or_else(|| AgentError::UnknownTool(call.name.clone()))?;

        *lock(&self.calls).entry(call.name.clone()).or_default() += 1;
        Ok(ToolResult::new(call, output.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_provider_replays_in_order() {
        let provider = MockProvider::with_responses([
            MockResponse::text("first"),
            MockResponse::text("second"),
        ]);
        let options = GenerationOptions::default();

        let a = provider.complete(&[], &[], ToolChoice::Auto, &options).await.unwrap();
        let b = provider.complete(&[], &[], ToolChoice::Auto, &options).await.unwrap();
        assert_eq!(a.content.as_deref(), Some("first"));
        assert_eq!(b.content.as_deref(), Some("second"));

        let exhausted = provider.complete(&[], &[], ToolChoice::Auto, &options).await;
        assert!(matches!(exhausted, Err(AgentError::Provider(_))));
        assert_eq!(provider.requests().len(), 3);
    }

    #[tokio::test]
    async fn test_static_toolset_rejects_unknown() {
        let tools = StaticToolset::new().with_tool("web_search", "results");
        let call = ToolCall::new("c1", "stock_quote", "{}");

        let err = tools.dispatch(&call).await.unwrap_err();
        assert!(matches!(err, AgentError::UnknownTool(name) if name == "stock_quote"));
        assert_eq!(tools.calls("web_search"), 0);
    }
}
