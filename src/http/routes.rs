//! Axum router configuration

use axum::{
    http::Method,
    middleware,
    routing::get,
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::fetch::Fetch;
use crate::state::AppState;

use super::handlers::{handle_proxy, health_check};
use super::middleware::{preflight_no_content, request_logger};

/// Create the Axum router with all routes
pub fn create_router<F: Fetch + 'static>(state: Arc<AppState<F>>) -> Router {
    // Build CORS layer
    // OPTIONS is answered here and never reaches the upstream.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::HEAD, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        // `get` also answers HEAD
        .route("/proxy/{*path}", get(handle_proxy::<F>))
        // Middleware
        .layer(cors)
        .layer(middleware::from_fn(preflight_no_content))
        .layer(middleware::from_fn(request_logger))
        .layer(TraceLayer::new_for_http())
        // State
        .with_state(state)
}
