//! # agent-core
//!
//! Single-turn tool-routing agent with a provider-agnostic LLM abstraction.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         Agent                               │
//! │  ┌─────────────┐  ┌─────────────┐  ┌─────────────────────┐  │
//! │  │    Turn     │  │   Toolset   │  │    LlmProvider      │  │
//! │  │ Orchestrator│──│ (dispatch)  │──│    (Strategy)       │  │
//! │  └─────────────┘  └─────────────┘  └─────────────────────┘  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! A turn forces the model to pick one tool, dispatches it, and asks the model
//! again with the tool output to produce the answer.

pub mod provider;
pub mod tool;
pub mod reasoning;
pub mod message;
pub mod error;
pub mod session;
pub mod mock;

pub use error::{AgentError, Result};
pub use message::{Message, Role};
pub use provider::{EmbeddingProvider, LlmProvider, ToolChoice};
pub use reasoning::{Agent, AgentBuilder, TurnOutcome};
pub use session::Session;
pub use tool::{ParameterSchema, ToolCall, ToolResult, ToolSchema, ToolTrace, Toolset, TraceSink};
