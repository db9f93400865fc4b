//! HTTP Handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use agent_core::{
    session::{Session, SessionId, SessionStore, TranscriptEntry},
    ToolTrace,
};

use crate::state::AppState;

type ApiError = (StatusCode, Json<ErrorResponse>);

// ============================================================================
// Request / Response Types
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub provider: String,
    pub provider_connected: bool,
    pub tools: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub message: String,
    pub session_id: String,
    pub trace: ToolTrace,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session_id: String,
    pub transcript: Vec<TranscriptEntry>,
    pub last_trace: Option<ToolTrace>,
}

#[derive(Debug, Serialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

fn error(status: StatusCode, error: impl Into<String>, code: &str) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
            code: code.into(),
        }),
    )
}

fn store_error(e: &agent_core::AgentError) -> ApiError {
    tracing::error!("Session store error: {}", e);
    error(StatusCode::INTERNAL_SERVER_ERROR, "Session storage failed", "SESSION_ERROR")
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let provider = state.agent.provider();
    let provider_connected = provider.health_check().await.unwrap_or(false);

    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        provider: provider.name().to_string(),
        provider_connected,
        tools: state.agent.tools().names(),
    })
}

/// Tool registry as sent to the model
pub async fn list_tools(State(state): State<AppState>) -> Json<Vec<ToolDescriptor>> {
    let tools = state
        .agent
        .tools()
        .schemas()
        .into_iter()
        .map(|s| ToolDescriptor {
            parameters: s.parameters_json(),
            name: s.name,
            description: s.description,
        })
        .collect();

    Json(tools)
}

/// Run one turn for a message
pub async fn chat_handler(
    State(state): State<AppState>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    if payload.message.trim().is_empty() {
        return Err(error(StatusCode::BAD_REQUEST, "Message is empty", "EMPTY_MESSAGE"));
    }

    let _turn = state.turn_lock.lock().await;

    let mut session = match payload.session_id {
        Some(id) => {
            let id = SessionId::from_string(id);
            state
                .sessions
                .load(&id)
                .map_err(|e| store_error(&e))?
                .unwrap_or_else(|| Session::with_id(id))
        }
        None => Session::new(),
    };

    session.append_user(payload.message.as_str());
    state.sessions.save(&session).map_err(|e| store_error(&e))?;

    let outcome = state.agent.respond(&payload.message).await.map_err(|e| {
        tracing::error!(session = %session.id, "Turn failed: {}", e);
        error(StatusCode::INTERNAL_SERVER_ERROR, e.user_message(), "TURN_FAILED")
    })?;

    session.append_answer(outcome.answer.as_str(), outcome.trace.clone());
    state.sessions.save(&session).map_err(|e| store_error(&e))?;

    Ok(Json(ChatResponse {
        message: outcome.answer,
        session_id: session.id.to_string(),
        trace: outcome.trace,
    }))
}

/// Transcript and last tool trace for a session
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionResponse>, ApiError> {
    let session = state
        .sessions
        .load(&SessionId::from_string(id))
        .map_err(|e| store_error(&e))?
        .ok_or_else(|| error(StatusCode::NOT_FOUND, "Session not found", "SESSION_NOT_FOUND"))?;

    Ok(Json(SessionResponse {
        session_id: session.id.to_string(),
        transcript: session.transcript().to_vec(),
        last_trace: session.last_trace,
    }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use agent_core::mock::{MockProvider, MockResponse};
    use agent_core::{Agent, Role};
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use lookup_tools::{service::MockLookups, LookupToolbox};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::routes::router;

    fn state(provider: Arc<MockProvider>) -> AppState {
        let lookups = Arc::new(MockLookups::new().with_documents("[]"));
        let agent = Agent::builder()
            .provider(provider)
            .tools(Arc::new(LookupToolbox::new(lookups.clone(), lookups.clone(), lookups)))
            .build()
            .unwrap();
        AppState::new(agent)
    }

    async fn send(state: &AppState, request: Request<Body>) -> (StatusCode, Value) {
        let response = router(state.clone()).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn chat(body: Value) -> Request<Body> {
        Request::post("/api/chat")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_chat_appends_answer_and_trace() {
        let provider = Arc::new(MockProvider::with_responses([
            MockResponse::tool_call("document_search", json!({"query": "invoice policy"})),
            MockResponse::text("I found no documents about that."),
        ]));
        let state = state(provider);

        let (status, body) = send(&state, chat(json!({"message": "invoice policy?"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "I found no documents about that.");
        assert_eq!(body["trace"]["tool"], "document_search");

        let id = body["session_id"].as_str().unwrap().to_string();
        let session = state.sessions.load(&SessionId::from_string(id)).unwrap().unwrap();
        let roles: Vec<Role> = session.transcript().iter().map(|e| e.role).collect();
        assert_eq!(roles, vec![Role::User, Role::Assistant]);
        assert_eq!(session.last_trace.unwrap().arguments["query"], "invoice policy");
    }

    #[tokio::test]
    async fn test_failed_turn_leaves_no_answer() {
        let provider = Arc::new(MockProvider::with_responses([MockResponse::text("no tool")]));
        let state = state(provider);

        let (status, body) = send(
            &state,
            chat(json!({"message": "hello", "session_id": "s-1"})),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["code"], "TURN_FAILED");

        let (status, body) = send(&state, Request::get("/api/sessions/s-1").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["transcript"].as_array().unwrap().len(), 1);
        assert_eq!(body["transcript"][0]["role"], "user");
        assert_eq!(body["last_trace"], Value::Null);
    }

    #[tokio::test]
    async fn test_provider_failure_body_not_returned() {
        let provider = Arc::new(MockProvider::with_responses([MockResponse::error(
            agent_core::AgentError::Provider(r#"400 Bad Request: {"error":"org-internal-id-42"}"#.into()),
        )]));
        let state = state(provider);

        let (status, body) = send(&state, chat(json!({"message": "hello"}))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["code"], "TURN_FAILED");
        assert_eq!(body["error"], "The AI service encountered an error.");
        assert!(!body.to_string().contains("org-internal-id-42"));
    }

    #[tokio::test]
    async fn test_empty_message_rejected() {
        let provider = Arc::new(MockProvider::new());
        let state = state(provider.clone());

        let (status, body) = send(&state, chat(json!({"message": "   "}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "EMPTY_MESSAGE");
        assert!(provider.requests().is_empty());
    }

    #[tokio::test]
    async fn test_list_tools() {
        let state = state(Arc::new(MockProvider::new()));

        let (status, body) = send(&state, Request::get("/api/tools").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 3);
        assert_eq!(body[2]["name"], "get_weather");
        assert_eq!(body[2]["parameters"]["required"], json!(["latitude", "longitude"]));
    }

    #[tokio::test]
    async fn test_unknown_session_is_404() {
        let state = state(Arc::new(MockProvider::new()));

        let (status, body) = send(&state, Request::get("/api/sessions/nope").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "SESSION_NOT_FOUND");
    }
}
