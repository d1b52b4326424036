//! HTTP API server for devices and trackers
//!
//! This module provides the REST/SSE boundary of the pipeline:
//! - POST /emergency/sos - Raise an alert
//! - POST /emergency/:id/location - Live location tick
//! - GET  /emergency/:id/location - Current position query
//! - POST /emergency/:id/cancel - Resolve an emergency
//! - GET  /emergency/:id/feed - Live event stream (SSE)
//! - POST /emergency/:id/recording - Emergency audio upload
//! - POST /recordings - Routine audio upload
//! - GET  /users/:id/recordings - Listing (payload excluded)
//! - GET  /recordings/:id - Playback bytes
//! - DELETE /recordings/:id - Owner-only deletion
//! - GET  /health - Health check

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;
