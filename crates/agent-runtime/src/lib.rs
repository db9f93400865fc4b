//! # agent-runtime
//!
//! Runtime providers for the lookup assistant.
//!
//! ## Providers
//!
//! - **OpenAI** (default): chat completions and embeddings, against either
//!   api.openai.com or an Azure OpenAI resource
//!
//! ## Usage
//!
//! ```rust,ignore
//! use agent_runtime::openai::{OpenAiConfig, OpenAiProvider};
//!
//! let chat = Arc::new(OpenAiProvider::new(OpenAiConfig::from_env()?)?);
//! let agent = Agent::builder()
//!     .provider(chat)
//!     .tools(toolbox)
//!     .build()?;
//! ```

#[cfg(feature = "openai")]
pub mod openai;

#[cfg(feature = "openai")]
pub use openai::{ApiFlavor, OpenAiConfig, OpenAiProvider};

// Re-export core types for convenience
pub use agent_core::{
    Agent, AgentError, EmbeddingProvider, LlmProvider, Message, Result, Role, Session, Toolset,
};
