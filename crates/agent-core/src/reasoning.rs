//! Turn Orchestration
//!
//! One turn is a fixed two-call exchange with the model:
//!
//! ```text
//! Init ──► AwaitingToolChoice ──► Dispatching ──► AwaitingFinalAnswer ──► Done
//! ```
//!
//! Any error aborts the turn in whatever state it reached.
//!
//! The first completion forces a tool call. Exactly one tool (the first call
//! returned) is dispatched, its result is appended to the history, and a second
//! completion with automatic tool choice produces the answer.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::{AgentError, Result};
use crate::message::{Conversation, Message};
use crate::provider::{GenerationOptions, LlmProvider, ToolChoice};
use crate::tool::{LogTraceSink, ToolTrace, Toolset, TraceSink};

/// Placeholder replaced with the turn's date in the system prompt
pub const DATE_PLACEHOLDER: &str = "{date}";

const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant. The current date is {date}";

/// Agent configuration
#[derive(Clone, Debug)]
pub struct AgentConfig {
    /// System prompt template; `{date}` becomes `YYYY-MM-DD`
    pub system_prompt: String,

    /// Generation options, shared by both completions
    pub generation: GenerationOptions,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.into(),
            generation: GenerationOptions::default(),
        }
    }
}

impl AgentConfig {
    /// Render the system instruction for a given date
    pub fn render_system_prompt(&self, date: NaiveDate) -> String {
        self.system_prompt
            .replace(DATE_PLACEHOLDER, &date.format("%Y-%m-%d").to_string())
    }
}

/// Where a turn is in its exchange with the model
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnState {
    Init,
    AwaitingToolChoice,
    Dispatching,
    AwaitingFinalAnswer,
    Done,
}

/// Everything a completed turn produced
#[derive(Clone, Debug)]
pub struct TurnOutcome {
    /// Final answer text
    pub answer: String,

    /// The tool that was dispatched and its arguments
    pub trace: ToolTrace,

    /// Message sequence sent with the second completion
    pub messages: Vec<Message>,
}

/// The turn orchestrator
pub struct Agent {
    provider: Arc<dyn LlmProvider>,
    tools: Arc<dyn Toolset>,
    trace_sink: Arc<dyn TraceSink>,
    config: AgentConfig,
}

impl Agent {
    /// Create a new agent
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        tools: Arc<dyn Toolset>,
        config: AgentConfig,
    ) -> Self {
        Self {
            provider,
            tools,
            trace_sink: Arc::new(LogTraceSink),
            config,
        }
    }

    pub fn builder() -> AgentBuilder {
        AgentBuilder::new()
    }

    /// Answer one user message, dated today (local time)
    pub async fn respond(&self, input: &str) -> Result<TurnOutcome> {
        self.respond_on(input, chrono::Local::now().date_naive()).await
    }

    /// Answer one user message with the system prompt dated `date`
    pub async fn respond_on(&self, input: &str, date: NaiveDate) -> Result<TurnOutcome> {
        let mut state = TurnState::Init;
        let result = self.run_turn(input, date, &mut state).await;

        if let Err(e) = &result {
            tracing::warn!(failed_in = ?state, error = %e, "Turn failed");
        }

        result
    }

    async fn run_turn(
        &self,
        input: &str,
        date: NaiveDate,
        state: &mut TurnState,
    ) -> Result<TurnOutcome> {
        let schemas = self.tools.schemas();
        let options = &self.config.generation;

        let mut conversation = Conversation::with_system_prompt(self.config.render_system_prompt(date));
        conversation.push(Message::user(input));

        *state = TurnState::AwaitingToolChoice;
        let completion = self
            .provider
            .complete(conversation.messages(), &schemas, ToolChoice::Required, options)
            .await?;

        let call = completion
            .first_tool_call()
            .cloned()
            .ok_or(AgentError::MissingToolCall)?;
        if completion.tool_calls.len() > 1 {
            tracing::debug!(
                offered = completion.tool_calls.len(),
                "Model returned several tool calls, using the first"
            );
        }
        let arguments = call.parsed_arguments()?;

        *state = TurnState::Dispatching;
        tracing::debug!(tool = %call.name, id = %call.id, "Dispatching tool");
        let result = self.tools.dispatch(&call).await?;

        let trace = ToolTrace {
            tool: call.name.clone(),
            arguments,
        };
        self.trace_sink.record(&trace);

        let call_id = call.id.clone();
        conversation.push(Message::assistant_tool_call(call));
        conversation.push(Message::tool(result.output, call_id));

        *state = TurnState::AwaitingFinalAnswer;
        let completion = self
            .provider
            .complete(conversation.messages(), &schemas, ToolChoice::Auto, options)
            .await?;
        let answer = completion.content.ok_or(AgentError::EmptyResponse)?;

        *state = TurnState::Done;
        Ok(TurnOutcome {
            answer,
            trace,
            messages: conversation.into_messages(),
        })
    }

    /// Get the toolset
    pub fn tools(&self) -> &dyn Toolset {
        self.tools.as_ref()
    }

    /// Get the provider
    pub fn provider(&self) -> &dyn LlmProvider {
        self.provider.as_ref()
    }

    /// Get configuration
    pub fn config(&self) -> &AgentConfig {
        &self.config
    }
}

/// Builder for Agent configuration
pub struct AgentBuilder {
    provider: Option<Arc<dyn LlmProvider>>,
    tools: Option<Arc<dyn Toolset>>,
    trace_sink: Option<Arc<dyn TraceSink>>,
    config: AgentConfig,
}

impl Default for AgentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AgentBuilder {
    pub fn new() -> Self {
        Self {
            provider: None,
            tools: None,
            trace_sink: None,
            config: AgentConfig::default(),
        }
    }

    pub fn provider(mut self, provider: Arc<dyn LlmProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn tools(mut self, tools: Arc<dyn Toolset>) -> Self {
        self.tools = Some(tools);
        self
    }

    pub fn trace_sink(mut self, sink: Arc<dyn TraceSink>) -> Self {
        self.trace_sink = Some(sink);
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = prompt.into();
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.generation.model = model.into();
        self
    }

    pub fn build(self) -> Result<Agent> {
        let provider = self.provider
            .ok_or_else(|| AgentError::Config("Provider is required".into()))?;
        let tools = self.tools
            .ok_or_else(|| AgentError::Config("Toolset is required".into()))?;

        let mut agent = Agent::new(provider, tools, self.config);
        if let Some(sink) = self.trace_sink {
            agent.trace_sink = sink;
        }
        Ok(agent)
    }
}
