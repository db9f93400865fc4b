//! OpenAI Provider
//!
//! Implementation of `LlmProvider` and `EmbeddingProvider` over the OpenAI
//! chat-completions and embeddings HTTP APIs. The same client talks to an
//! Azure OpenAI resource when configured with `ApiFlavor::Azure`.

use agent_core::{
    error::{AgentError, Result},
    message::{Message, Role},
    provider::{
        Completion, EmbeddingProvider, FinishReason, GenerationOptions, LlmProvider, TokenUsage,
        ToolChoice,
    },
    tool::{ToolCall, ToolSchema},
};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_AZURE_API_VERSION: &str = "2024-06-01";
const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-large";

/// Which dialect of the API to speak
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ApiFlavor {
    /// api.openai.com style: bearer token, model in the request body
    OpenAi,
    /// Azure OpenAI: `api-key` header, model addressed as a deployment path
    Azure { api_version: String },
}

/// OpenAI provider configuration
#[derive(Clone, Debug)]
pub struct OpenAiConfig {
    /// API base URL (OpenAI) or resource endpoint (Azure)
    pub base_url: String,

    /// API key
    pub api_key: String,

    /// API dialect
    pub flavor: ApiFlavor,

    /// Embedding model or Azure deployment name
    pub embedding_model: String,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            api_key: String::new(),
            flavor: ApiFlavor::OpenAi,
            embedding_model: DEFAULT_EMBEDDING_MODEL.into(),
        }
    }
}

impl OpenAiConfig {
    /// `OPENAI_API_KEY` (required) and `OPENAI_BASE_URL`
    pub fn from_env() -> Result<Self> {
        Self::from_vars(&process_env)
    }

    /// `AZURE_OPENAI_API_KEY`, `AZURE_OPENAI_ENDPOINT` (required),
    /// `AZURE_OPENAI_API_VERSION` and `AZURE_OPENAI_EMBEDDING_DEPLOYMENT`
    pub fn azure_from_env() -> Result<Self> {
        Self::azure_from_vars(&process_env)
    }

    fn from_vars(vars: &dyn Fn(&str) -> Option<String>) -> Result<Self> {
        Ok(Self {
            base_url: vars("OPENAI_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.into()),
            api_key: require(vars, "OPENAI_API_KEY")?,
            ..Default::default()
        })
    }

    fn azure_from_vars(vars: &dyn Fn(&str) -> Option<String>) -> Result<Self> {
        let api_version = vars("AZURE_OPENAI_API_VERSION").unwrap_or_else(|| DEFAULT_AZURE_API_VERSION.into());
        let embedding_model =
            vars("AZURE_OPENAI_EMBEDDING_DEPLOYMENT").unwrap_or_else(|| DEFAULT_EMBEDDING_MODEL.into());

        Ok(Self {
            base_url: require(vars, "AZURE_OPENAI_ENDPOINT")?,
            api_key: require(vars, "AZURE_OPENAI_API_KEY")?,
            flavor: ApiFlavor::Azure { api_version },
            embedding_model,
        })
    }
}

fn process_env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

fn require(vars: &dyn Fn(&str) -> Option<String>, name: &str) -> Result<String> {
    vars(name).ok_or_else(|| AgentError::Config(format!("{} is not set", name)))
}

/// OpenAI / Azure OpenAI provider
pub struct OpenAiProvider {
    client: Client,
    config: OpenAiConfig,
}

impl OpenAiProvider {
    pub fn new(config: OpenAiConfig) -> Result<Self> {
        if config.api_key.is_empty() {
            return Err(AgentError::Config("API key is empty".into()));
        }
        Ok(Self {
            client: Client::new(),
            config,
        })
    }

    /// Create from `OPENAI_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::new(OpenAiConfig::from_env()?)
    }

    /// Create from `AZURE_OPENAI_*` environment variables
    pub fn azure_from_env() -> Result<Self> {
        Self::new(OpenAiConfig::azure_from_env()?)
    }

    fn base(&self) -> &str {
        self.config.base_url.trim_end_matches('/')
    }

    /// URL for an operation against `model` (`chat/completions`, `embeddings`)
    fn endpoint(&self, model: &str, operation: &str) -> String {
        match &self.config.flavor {
            ApiFlavor::OpenAi => format!("{}/{}", self.base(), operation),
            ApiFlavor::Azure { api_version } => format!(
                "{}/openai/deployments/{}/{}?api-version={}",
                self.base(),
                model,
                operation,
                api_version
            ),
        }
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.config.flavor {
            ApiFlavor::OpenAi => request.bearer_auth(&self.config.api_key),
            ApiFlavor::Azure { .. } => request.header("api-key", &self.config.api_key),
        }
    }

    async fn post<B: Serialize + Sync, R: for<'de> Deserialize<'de>>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<R> {
        let response = self
            .authorize(self.client.post(url))
            .json(body)
            .send()
            .await
            .map_err(|e| AgentError::ProviderUnavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(status_error(status, text));
        }

        response
            .json::<R>()
            .await
            .map_err(|e| AgentError::Provider(format!("unreadable response: {}", e)))
    }

    /// Convert agent messages to wire format
    fn convert_messages(messages: &[Message]) -> Vec<WireMessage> {
        messages
            .iter()
            .map(|m| {
                let tool_calls: Vec<WireToolCall> =
                    m.tool_calls.iter().map(WireToolCall::from).collect();
                let content = if m.role == Role::Assistant && m.has_tool_calls() && m.content.is_empty() {
                    None
                } else {
                    Some(m.content.clone())
                };

                WireMessage {
                    role: m.role.to_string(),
                    content,
                    tool_calls: (!tool_calls.is_empty()).then_some(tool_calls),
                    tool_call_id: m.tool_call_id.clone(),
                }
            })
            .collect()
    }

    fn convert_tools(tools: &[ToolSchema]) -> Vec<WireTool> {
        tools
            .iter()
            .map(|t| WireTool {
                kind: "function",
                function: WireFunctionDef {
                    name: t.name.clone(),
                    description: t.description.clone(),
                    parameters: t.parameters_json(),
                    strict: t.strict,
                },
            })
            .collect()
    }

    /// Convert the wire response to an agent completion
    fn convert_completion(response: ChatResponse, model: &str) -> Result<Completion> {
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AgentError::Provider("response contained no choices".into()))?;

        Ok(Completion {
            content: choice.message.content,
            tool_calls: choice
                .message
                .tool_calls
                .unwrap_or_default()
                .into_iter()
                .map(|c| ToolCall::new(c.id, c.function.name, c.function.arguments))
                .collect(),
            model: response.model.unwrap_or_else(|| model.to_string()),
            usage: response.usage.map(|u| TokenUsage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
                total_tokens: u.total_tokens,
            }),
            finish_reason: choice.finish_reason.as_deref().map(FinishReason::parse),
        })
    }
}

fn status_error(status: StatusCode, body: String) -> AgentError {
    let detail = format!("{}: {}", status, body);
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        AgentError::Auth(detail)
    } else if status == StatusCode::TOO_MANY_REQUESTS {
        AgentError::RateLimited(detail)
    } else if status.is_server_error() {
        AgentError::ProviderUnavailable(detail)
    } else {
        AgentError::Provider(detail)
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    fn name(&self) -> &str {
        match self.config.flavor {
            ApiFlavor::OpenAi => "OpenAI",
            ApiFlavor::Azure { .. } => "Azure OpenAI",
        }
    }

    async fn health_check(&self) -> Result<bool> {
        let url = match &self.config.flavor {
            ApiFlavor::OpenAi => format!("{}/models", self.base()),
            ApiFlavor::Azure { api_version } => {
                format!("{}/openai/models?api-version={}", self.base(), api_version)
            }
        };

        match self.authorize(self.client.get(&url)).send().await {
            Ok(response) => Ok(response.status().is_success()),
            Err(e) => {
                tracing::warn!("{} health check failed: {}", self.name(), e);
                Ok(false)
            }
        }
    }

    async fn complete(
        &self,
        messages: &[Message],
        tools: &[ToolSchema],
        tool_choice: ToolChoice,
        options: &GenerationOptions,
    ) -> Result<Completion> {
        let request = ChatRequest {
            model: &options.model,
            messages: Self::convert_messages(messages),
            tool_choice: (!tools.is_empty()).then(|| tool_choice.as_str()),
            tools: Self::convert_tools(tools),
            temperature: options.temperature,
            max_tokens: options.max_tokens,
        };

        tracing::debug!(
            model = %options.model,
            messages = messages.len(),
            tool_choice = tool_choice.as_str(),
            "Requesting chat completion"
        );

        let url = self.endpoint(&options.model, "chat/completions");
        let response: ChatResponse = self.post(&url, &request).await?;
        Self::convert_completion(response, &options.model)
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let model = &self.config.embedding_model;
        let request = EmbeddingRequest { input: text, model };

        tracing::debug!(model = %model, chars = text.len(), "Requesting embedding");

        let url = self.endpoint(model, "embeddings");
        let response: EmbeddingResponse = self.post(&url, &request).await?;
        response
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| AgentError::Provider("response contained no embedding".into()))
    }
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<WireTool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
struct WireMessage {
    role: String,
    content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<WireToolCall>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireToolCall {
    id: String,
    #[serde(rename = "type", default = "function_kind")]
    kind: String,
    function: WireFunctionCall,
}

fn function_kind() -> String {
    "function".into()
}

impl From<&ToolCall> for WireToolCall {
    fn from(call: &ToolCall) -> Self {
        Self {
            id: call.id.clone(),
            kind: function_kind(),
            function: WireFunctionCall {
                name: call.name.clone(),
                arguments: call.arguments.clone(),
            },
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct WireFunctionCall {
    name: String,
    arguments: String,
}

#[derive(Serialize)]
struct WireTool {
    #[serde(rename = "type")]
    kind: &'static str,
    function: WireFunctionDef,
}

#[derive(Serialize)]
struct WireFunctionDef {
    name: String,
    description: String,
    parameters: serde_json::Value,
    strict: bool,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    model: Option<String>,
    choices: Vec<WireChoice>,
    #[serde(default)]
    usage: Option<WireUsage>,
}

#[derive(Deserialize)]
struct WireChoice {
    message: WireResponseMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct WireResponseMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<WireToolCall>>,
}

#[derive(Deserialize)]
struct WireUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    input: &'a str,
    model: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}
