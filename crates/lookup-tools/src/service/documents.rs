//! Document Search
//!
//! Hybrid (full-text + vector) retrieval against an Azure AI Search index
//! with semantic ranking. The query is embedded first, then both the text and
//! the vector are sent in one search request.

use std::sync::Arc;

use agent_core::EmbeddingProvider;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{process_env, require, DocumentLookup};
use crate::error::{LookupError, Result};

/// Nearest neighbours and result cutoff for every document search
pub const TOP_K: usize = 10;

const DEFAULT_API_VERSION: &str = "2024-07-01";

/// A hybrid query as sent to the index
#[derive(Clone, Debug)]
pub struct HybridQuery<'a> {
    pub text: &'a str,
    pub vector: Vec<f32>,
    pub k: usize,
}

/// Index that answers hybrid queries with ordered records
#[async_trait]
pub trait SearchIndex: Send + Sync {
    async fn hybrid_search(&self, query: &HybridQuery<'_>) -> Result<Vec<Value>>;
}

/// Document lookup adapter: embed, search, serialize
pub struct DocumentSearch {
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn SearchIndex>,
}

impl DocumentSearch {
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, index: Arc<dyn SearchIndex>) -> Self {
        Self { embedder, index }
    }
}

#[async_trait]
impl DocumentLookup for DocumentSearch {
    async fn search(&self, query: &str) -> Result<String> {
        let vector = self.embedder.embed(query).await?;

        let records = self
            .index
            .hybrid_search(&HybridQuery {
                text: query,
                vector,
                k: TOP_K,
            })
            .await?;

        tracing::debug!(records = records.len(), "Document search finished");
        Ok(serde_json::to_string(&records)?)
    }
}

/// Azure AI Search configuration
#[derive(Clone, Debug)]
pub struct AzureSearchConfig {
    /// Service endpoint, e.g. `https://my-search.search.windows.net`
    pub endpoint: String,
    pub index: String,
    pub api_key: String,
    pub semantic_configuration: String,
    pub api_version: String,
    /// Field holding the document embeddings
    pub vector_field: String,
    /// Fields returned for each record
    pub select: Vec<String>,
}

impl AzureSearchConfig {
    pub fn new(
        endpoint: impl Into<String>,
        index: impl Into<String>,
        api_key: impl Into<String>,
        semantic_configuration: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            index: index.into(),
            api_key: api_key.into(),
            semantic_configuration: semantic_configuration.into(),
            api_version: DEFAULT_API_VERSION.into(),
            vector_field: "text_vector".into(),
            select: vec!["title".into(), "chunk".into()],
        }
    }

    pub fn from_env() -> Result<Self> {
        Self::from_vars(&process_env)
    }

    fn from_vars(vars: &dyn Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::new(
            require(vars, "AZURE_SEARCH_SERVICE_ENDPOINT")?,
            require(vars, "AZURE_SEARCH_INDEX")?,
            require(vars, "AZURE_SEARCH_API_KEY")?,
            require(vars, "AZURE_SEARCH_SEMANTIC_SEARCH_CONFIG")?,
        );
        if let Some(version) = vars("AZURE_SEARCH_API_VERSION") {
            config.api_version = version;
        }
        Ok(config)
    }
}

/// Azure AI Search REST client
pub struct AzureSearchIndex {
    client: Client,
    config: AzureSearchConfig,
}

impl AzureSearchIndex {
    pub fn new(config: AzureSearchConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    pub fn from_env() -> Result<Self> {
        Ok(Self::new(AzureSearchConfig::from_env()?))
    }

    fn url(&self) -> String {
        format!(
            "{}/indexes/{}/docs/search?api-version={}",
            self.config.endpoint.trim_end_matches('/'),
            self.config.index,
            self.config.api_version
        )
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchRequest<'a> {
    search: &'a str,
    vector_queries: [VectorQuery<'a>; 1],
    select: String,
    top: usize,
    query_type: &'static str,
    semantic_configuration: &'a str,
}

#[derive(Serialize)]
struct VectorQuery<'a> {
    kind: &'static str,
    vector: &'a [f32],
    fields: &'a str,
    k: usize,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    value: Vec<Value>,
}

#[async_trait]
impl SearchIndex for AzureSearchIndex {
    async fn hybrid_search(&self, query: &HybridQuery<'_>) -> Result<Vec<Value>> {
        let request = SearchRequest {
            search: query.text,
            vector_queries: [VectorQuery {
                kind: "vector",
                vector: &query.vector,
                fields: &self.config.vector_field,
                k: query.k,
            }],
            select: self.config.select.join(","),
            top: query.k,
            query_type: "semantic",
            semantic_configuration: &self.config.semantic_configuration,
        };

        let response = self
            .client
            .post(self.url())
            .header("api-key", &self.config.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LookupError::Search(format!("{}: {}", status, body)));
        }

        Ok(response.json::<SearchResponse>().await?.value)
    }
}
