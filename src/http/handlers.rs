use super::state::AppState;
use crate::error::CoreError;
use crate::model::{GeoPoint, SessionOwner};
use crate::recording::IngestRequest;
use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::sse::{Event as SseEvent, KeepAlive, Sse},
    response::{IntoResponse, Json, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use tracing::error;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SosRequest {
    /// Registered user raising the alert; absent for anonymous SOS
    pub user_id: Option<String>,

    /// Position known at trigger time, if any
    pub location: Option<GeoPoint>,
}

#[derive(Debug, Serialize)]
pub struct SosResponse {
    pub message: String,
    pub session_id: String,
}

#[derive(Debug, Deserialize)]
pub struct LocationUpdateRequest {
    pub location: GeoPoint,

    /// Instant the device observed the position; defaults to receipt time
    pub observed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct CancelRequest {
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CancelResponse {
    pub success: bool,
}

#[derive(Debug, Deserialize)]
pub struct UploadParams {
    pub user_id: String,

    /// Optional annotations supplied by the analysis service
    pub transcript: Option<String>,
    pub emotion: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub success: bool,
    pub recording_id: String,
}

#[derive(Debug, Deserialize)]
pub struct DeleteParams {
    pub user_id: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn error_response(err: CoreError) -> Response {
    let status = match &err {
        CoreError::SessionNotFound(_)
        | CoreError::RecordingNotFound(_)
        | CoreError::UserNotFound(_) => StatusCode::NOT_FOUND,
        CoreError::NoPayload
        | CoreError::PayloadTooLarge { .. }
        | CoreError::InvalidOwner(_)
        | CoreError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        CoreError::Forbidden(_) => StatusCode::FORBIDDEN,
        CoreError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
    };

    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
        .into_response()
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /emergency/sos
/// Open an emergency session and alert the owner's contacts
pub async fn send_sos(State(state): State<AppState>, Json(req): Json<SosRequest>) -> Response {
    let owner = match req.user_id {
        Some(user_id) => SessionOwner::Owned { user_id },
        None => SessionOwner::Anonymous,
    };

    match state.manager.create_session(owner, req.location).await {
        Ok(session_id) => (
            StatusCode::OK,
            Json(SosResponse {
                message: "Emergency alert sent successfully".to_string(),
                session_id,
            }),
        )
            .into_response(),
        Err(e) => {
            error!("failed to open emergency session: {}", e);
            error_response(e)
        }
    }
}

/// POST /emergency/:session_id/location
/// Ingest a live location tick from the owning device
pub async fn update_location(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(req): Json<LocationUpdateRequest>,
) -> Response {
    let observed_at = req.observed_at.unwrap_or_else(Utc::now);

    match state
        .manager
        .update_location(&session_id, req.location, observed_at)
        .await
    {
        Ok(()) => StatusCode::OK.into_response(),
        Err(e) => error_response(e),
    }
}

/// GET /emergency/:session_id/location
/// Current position for trackers
pub async fn current_location(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Response {
    match state.manager.current_location(&session_id).await {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(e) => error_response(e),
    }
}

/// POST /emergency/:session_id/cancel
/// Resolve an emergency; idempotent
pub async fn cancel_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(req): Json<CancelRequest>,
) -> Response {
    match state
        .manager
        .cancel_session(&session_id, req.user_id.as_deref())
        .await
    {
        Ok(()) => (StatusCode::OK, Json(CancelResponse { success: true })).into_response(),
        Err(e) => error_response(e),
    }
}

/// GET /emergency/:session_id/feed
/// Live event stream for the session's topic (SSE). History is not
/// replayed; clients query current state after connecting.
pub async fn join_feed(State(state): State<AppState>, Path(session_id): Path<String>) -> Response {
    if let Err(e) = state.manager.session(&session_id).await {
        return error_response(e);
    }

    let subscription = state.manager.subscribe(&session_id);

    let stream = futures::stream::unfold(subscription, |mut subscription| async move {
        let event = subscription.recv().await?;
        let sse = SseEvent::default()
            .event(event.name())
            .json_data(&event)
            .ok()?;
        Some((Ok::<_, Infallible>(sse), subscription))
    });

    Sse::new(stream)
        .keep_alive(KeepAlive::default())
        .into_response()
}

/// POST /recordings?user_id=...
/// Routine-analysis upload; raw audio bytes in the body
pub async fn upload_recording(
    State(state): State<AppState>,
    Query(params): Query<UploadParams>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    ingest(state, params, None, false, headers, body).await
}

/// POST /emergency/:session_id/recording?user_id=...
/// Emergency capture: stored, linked to the session, announced on the
/// topic, and contacts get a playback link
pub async fn upload_emergency_recording(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Query(params): Query<UploadParams>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    ingest(state, params, Some(session_id), true, headers, body).await
}

async fn ingest(
    state: AppState,
    params: UploadParams,
    session_id: Option<String>,
    emergency: bool,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("audio/wav")
        .to_string();

    let declared_size = headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
        .unwrap_or(body.len() as u64);

    let request = IngestRequest {
        owner_id: params.user_id,
        session_id,
        content_type,
        declared_size,
        payload: body.to_vec(),
        transcript: params.transcript,
        emotion_label: params.emotion,
        emergency,
    };

    match state.ingestor.ingest(request).await {
        Ok(recording_id) => (
            StatusCode::OK,
            Json(UploadResponse {
                success: true,
                recording_id,
            }),
        )
            .into_response(),
        Err(e) => {
            error!("recording upload rejected: {}", e);
            error_response(e)
        }
    }
}

/// GET /users/:user_id/recordings
/// Owner's recordings, newest first, payload excluded
pub async fn list_user_recordings(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Response {
    match state.ingestor.list_recordings(&user_id).await {
        Ok(summaries) => (StatusCode::OK, Json(summaries)).into_response(),
        Err(e) => error_response(e),
    }
}

/// GET /recordings/:recording_id
/// Raw audio bytes with the declared media type
pub async fn fetch_recording(
    State(state): State<AppState>,
    Path(recording_id): Path<String>,
) -> Response {
    match state.ingestor.fetch_payload(&recording_id).await {
        Ok((content_type, data)) => {
            ([(header::CONTENT_TYPE, content_type)], data).into_response()
        }
        Err(e) => error_response(e),
    }
}

/// DELETE /recordings/:recording_id?user_id=...
/// Owner-only deletion
pub async fn delete_recording(
    State(state): State<AppState>,
    Path(recording_id): Path<String>,
    Query(params): Query<DeleteParams>,
) -> Response {
    match state
        .ingestor
        .delete_recording(&recording_id, &params.user_id)
        .await
    {
        Ok(()) => (StatusCode::OK, Json(CancelResponse { success: true })).into_response(),
        Err(e) => error_response(e),
    }
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
