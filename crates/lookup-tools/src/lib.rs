//! # lookup-tools
//!
//! The three lookups the assistant can route a message to:
//!
//! - **document_search**: hybrid vector + full-text search over an Azure AI
//!   Search index, embeddings from Azure OpenAI
//! - **web_search**: Bing Web Search, en-US, 10 results, past week
//! - **get_weather**: current temperature from Open-Meteo
//!
//! The capability set is closed. [`Capability`] decodes a model tool call into
//! one typed variant, and [`LookupToolbox`] runs it against the matching
//! service.

pub mod capability;
pub mod service;
pub mod toolbox;
pub mod error;

pub use capability::{descriptors, Capability, Coordinates, QueryArgs};
pub use error::{LookupError, Result};
pub use toolbox::LookupToolbox;
