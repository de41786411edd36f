//! Router assembly.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Builds the relay router: a health probe plus the per-platform webhook
/// endpoint.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/{platform}", post(handlers::receive_webhook))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
