//! Bing Web Search
//!
//! Market, result count and freshness are fixed. A non-200 status is not an
//! error: it becomes a plain-text tool result so the model can explain the
//! failure in its answer.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;

use super::{process_env, require, WebLookup};
use crate::error::Result;

const MARKET: &str = "en-US";
const COUNT: &str = "10";
const FRESHNESS: &str = "Week";

/// Bing Web Search configuration
#[derive(Clone, Debug)]
pub struct BingConfig {
    /// Full search endpoint, e.g. `https://api.bing.microsoft.com/v7.0/search`
    pub endpoint: String,
    pub subscription_key: String,
}

impl BingConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_vars(&process_env)
    }

    fn from_vars(vars: &dyn Fn(&str) -> Option<String>) -> Result<Self> {
        Ok(Self {
            endpoint: require(vars, "BING_ENDPOINT")?,
            subscription_key: require(vars, "BING_KEY")?,
        })
    }
}

/// Bing Web Search client
pub struct BingWebSearch {
    client: Client,
    config: BingConfig,
}

impl BingWebSearch {
    pub fn new(config: BingConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    pub fn from_env() -> Result<Self> {
        Ok(Self::new(BingConfig::from_env()?))
    }
}

/// Tool result text for a failed search
pub fn status_message(status: StatusCode) -> String {
    format!("Error: Unable to fetch data. Status code: {}", status.as_u16())
}

#[async_trait]
impl WebLookup for BingWebSearch {
    async fn search(&self, query: &str) -> Result<String> {
        let response = self
            .client
            .get(&self.config.endpoint)
            .header("Ocp-Apim-Subscription-Key", &self.config.subscription_key)
            .query(&[
                ("q", query),
                ("mkt", MARKET),
                ("count", COUNT),
                ("freshness", FRESHNESS),
            ])
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            tracing::warn!(status = status.as_u16(), "Web search returned a non-success status");
            return Ok(status_message(status));
        }

        let body: Value = response.json().await?;
        Ok(serde_json::to_string(&body)?)
    }
}
