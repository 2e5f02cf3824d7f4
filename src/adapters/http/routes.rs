//! HTTP routes for the chat API.

use axum::routing::{get, post};
use axum::Router;

use super::handlers::{chat, health, ChatHandlers};

/// Creates the API router.
pub fn api_routes(handlers: ChatHandlers) -> Router {
    Router::new()
        .route("/api/v1/chat", post(chat))
        .route("/health", get(health))
        .with_state(handlers)
}
