use super::handlers;
use super::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    let max_upload_bytes = state.max_upload_bytes;

    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Page and identity
        .route("/", get(handlers::index))
        .route("/username", post(handlers::submit_username))
        // Capture
        .route(
            "/record",
            post(handlers::record_upload).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route("/record/microphone", post(handlers::record_microphone))
        .route("/recording/audio", get(handlers::recording_audio))
        // Submission
        .route("/upload", post(handlers::upload))
        .route("/discard", post(handlers::discard))
        // Session queries
        .route("/api/session", get(handlers::session_status))
        // Add tracing middleware for request logging
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}
