//! Lookup Services
//!
//! Adapter traits for each external lookup and their HTTP implementations.

mod documents;
mod bing;
mod open_meteo;
mod mock;

pub use documents::{AzureSearchConfig, AzureSearchIndex, DocumentSearch, HybridQuery, SearchIndex, TOP_K};
pub use bing::{BingConfig, BingWebSearch};
pub use open_meteo::{OpenMeteoClient, OpenMeteoConfig};
pub use mock::MockLookups;

use async_trait::async_trait;
use serde_json::Number;

use crate::error::{LookupError, Result};

/// Document lookup: query text in, serialized records out
#[async_trait]
pub trait DocumentLookup: Send + Sync {
    async fn search(&self, query: &str) -> Result<String>;
}

/// Web lookup: query text in, serialized response (or status message) out
#[async_trait]
pub trait WebLookup: Send + Sync {
    async fn search(&self, query: &str) -> Result<String>;
}

/// Weather lookup: coordinates in, current temperature out
#[async_trait]
pub trait WeatherLookup: Send + Sync {
    async fn current_temperature(&self, latitude: f64, longitude: f64) -> Result<Number>;
}

/// Reads a variable from the process environment
pub(crate) fn process_env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

pub(crate) fn require(vars: &dyn Fn(&str) -> Option<String>, name: &str) -> Result<String> {
    vars(name).ok_or_else(|| LookupError::Config(format!("{} is not set", name)))
}
