use crate::interface_adapters::handlers::matching::{health, leave, request_match};
use crate::interface_adapters::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

// Build the HTTP router for matchmaking endpoints.
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/match", post(request_match))
        .route("/match/leave", post(leave))
        .route("/health", get(health))
        .with_state(state)
}
