//! Lookup assistant HTTP server
//!
//! Axum front door for the single-turn lookup assistant. Each POST to
//! `/api/chat` runs one turn: the model picks one of the document, web or
//! weather lookups, the lookup runs, and the model answers from its result.

mod handlers;
mod routes;
mod state;

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use agent_core::{provider::DEFAULT_MODEL, Agent, LlmProvider};
use agent_runtime::OpenAiProvider;
use lookup_tools::{
    service::{AzureSearchIndex, BingWebSearch, DocumentSearch, OpenMeteoClient},
    LookupToolbox,
};

use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment
    dotenvy::dotenv().ok();

    // Chat model
    let chat = Arc::new(OpenAiProvider::from_env()?);
    match chat.health_check().await {
        Ok(true) => tracing::info!("✓ Connected to {}", chat.name()),
        Ok(false) | Err(_) => {
            tracing::warn!("⚠ {} not reachable - turns will fail", chat.name());
        }
    }

    // Lookup services
    let embedder = Arc::new(OpenAiProvider::azure_from_env()?);
    let documents = Arc::new(DocumentSearch::new(embedder, Arc::new(AzureSearchIndex::from_env()?)));
    let web = Arc::new(BingWebSearch::from_env()?);
    let weather = Arc::new(OpenMeteoClient::from_env());
    let toolbox = Arc::new(LookupToolbox::new(documents, web, weather));

    let model = std::env::var("OPENAI_CHAT_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.into());
    let agent = Agent::builder()
        .provider(chat)
        .tools(toolbox)
        .model(model)
        .build()?;

    tracing::info!("Model: {}", agent.config().generation.model);
    tracing::info!("Registered tools:");
    for name in agent.tools().names() {
        tracing::info!("  • {}", name);
    }

    let app = routes::router(AppState::new(agent));

    // Start server
    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Lookup assistant running on http://{}", addr);
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /health             - Health check");
    tracing::info!("  GET  /api/tools          - Tool registry");
    tracing::info!("  POST /api/chat           - Send message");
    tracing::info!("  GET  /api/sessions/{{id}}  - Transcript and last trace");

    axum::serve(listener, app).await?;

    Ok(())
}
