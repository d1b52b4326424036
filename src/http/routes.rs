use super::handlers;
use super::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::time::Duration;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};

/// Create the HTTP router with all routes
///
/// `max_body_bytes` should sit above the ingest ceiling so oversized
/// uploads reach the ingestor and get the proper error body instead of
/// a bare 413.
pub fn create_router(state: AppState, upload_timeout: Duration, max_body_bytes: usize) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Emergency lifecycle
        .route("/emergency/sos", post(handlers::send_sos))
        .route(
            "/emergency/:session_id/location",
            post(handlers::update_location).get(handlers::current_location),
        )
        .route("/emergency/:session_id/cancel", post(handlers::cancel_session))
        .route("/emergency/:session_id/feed", get(handlers::join_feed))
        // Recording intake (bounded transfers)
        .route(
            "/emergency/:session_id/recording",
            post(handlers::upload_emergency_recording)
                .layer::<_, std::convert::Infallible>(DefaultBodyLimit::max(max_body_bytes))
                .layer(TimeoutLayer::new(upload_timeout)),
        )
        .route(
            "/recordings",
            post(handlers::upload_recording)
                .layer::<_, std::convert::Infallible>(DefaultBodyLimit::max(max_body_bytes))
                .layer(TimeoutLayer::new(upload_timeout)),
        )
        // Recording queries
        .route(
            "/recordings/:recording_id",
            get(handlers::fetch_recording).delete(handlers::delete_recording),
        )
        .route(
            "/users/:user_id/recordings",
            get(handlers::list_user_recordings),
        )
        // Add tracing middleware for request logging
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
