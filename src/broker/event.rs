use crate::model::GeoPoint;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Events published on a session's topic
///
/// Delivery is at-most-once per connected subscriber; there is no
/// backlog or replay. A subscriber that wants current state must query
/// it after subscribing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SessionEvent {
    #[serde(rename = "location-updated")]
    LocationUpdated {
        session_id: String,
        location: GeoPoint,
        observed_at: DateTime<Utc>,
    },

    /// Terminal event: no further location updates will follow
    #[serde(rename = "emergency-cancelled")]
    Cancelled {
        session_id: String,
        at: DateTime<Utc>,
    },

    #[serde(rename = "new-recording")]
    RecordingAdded {
        session_id: String,
        recording_id: String,
        at: DateTime<Utc>,
    },
}

impl SessionEvent {
    pub fn session_id(&self) -> &str {
        match self {
            SessionEvent::LocationUpdated { session_id, .. } => session_id,
            SessionEvent::Cancelled { session_id, .. } => session_id,
            SessionEvent::RecordingAdded { session_id, .. } => session_id,
        }
    }

    /// Stable wire name, used as the SSE event name
    pub fn name(&self) -> &'static str {
        match self {
            SessionEvent::LocationUpdated { .. } => "location-updated",
            SessionEvent::Cancelled { .. } => "emergency-cancelled",
            SessionEvent::RecordingAdded { .. } => "new-recording",
        }
    }
}
