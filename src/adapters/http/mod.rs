//! HTTP surface: thin axum glue over the session manager.

mod handlers;
mod routes;

pub use handlers::{ChatHandlers, ChatRequest, ChatResponse, ErrorBody};
pub use routes::api_routes;
