//! Router

use axum::{routing::{get, post}, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::handlers::{chat_handler, get_session, health_check, list_tools};
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health & info
        .route("/health", get(health_check))
        .route("/api/tools", get(list_tools))

        // Turns
        .route("/api/chat", post(chat_handler))
        .route("/api/sessions/{id}", get(get_session))

        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
