//! Router configuration for the HTTP API.
//!
//! This module sets up the routes and middleware (CORS, body limit,
//! compression, tracing) and creates the axum router ready for serving.

use axum::{
    extract::DefaultBodyLimit,
    http::{header, Method},
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers;
use super::state::AppState;
use crate::api::UPLOAD_PATH;

/// Create the application router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    // Per-file limits are enforced while streaming; this caps the whole body.
    let body_limit = state.config.max_request_size();

    Router::new()
        .route("/health", get(handlers::health_check))
        .route(UPLOAD_PATH, post(handlers::upload_files))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
