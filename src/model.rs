//! Core domain types: sessions, users, contacts, recordings

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Geographic coordinates reported by the owning device
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    /// Whether the coordinates fall inside the valid WGS84 ranges
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// Who raised the emergency
///
/// Anonymous alerts must never be dropped: they are persisted like any
/// other session, just with no contacts to alert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SessionOwner {
    /// A registered user; their emergency contacts get alerted
    Owned { user_id: String },
    /// No account attached
    Anonymous,
}

impl SessionOwner {
    pub fn user_id(&self) -> Option<&str> {
        match self {
            SessionOwner::Owned { user_id } => Some(user_id),
            SessionOwner::Anonymous => None,
        }
    }
}

/// Session lifecycle state; Active -> Resolved only, Resolved is terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Active,
    Resolved,
}

/// Durable record of one emergency episode
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmergencySession {
    pub id: String,
    pub owner: SessionOwner,
    pub status: SessionStatus,

    /// Durable shadow of the live location cache; refreshed on cancellation
    pub last_known_location: Option<GeoPoint>,

    pub created_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,

    /// Append-only. May still grow briefly after Resolved when an
    /// in-flight upload completes.
    pub recording_ids: Vec<String>,

    pub notes: Option<String>,
}

impl EmergencySession {
    pub fn new(owner: SessionOwner, initial_location: Option<GeoPoint>) -> Self {
        let notes = match owner {
            SessionOwner::Anonymous => Some("Anonymous emergency alert".to_string()),
            SessionOwner::Owned { .. } => None,
        };

        Self {
            id: format!("sos-{}", uuid::Uuid::new_v4()),
            owner,
            status: SessionStatus::Active,
            last_known_location: initial_location,
            created_at: Utc::now(),
            resolved_at: None,
            recording_ids: Vec::new(),
            notes,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == SessionStatus::Active
    }
}

/// An emergency contact, copied by value into each notification call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub name: String,
    pub phone: String,
}

/// Directory record for a registered user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub contacts: Vec<Contact>,
}

/// Binary audio content plus what the uploader declared about it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioPayload {
    pub content_type: String,
    pub declared_size: u64,
    pub data: Vec<u8>,
}

/// A stored audio artifact; created once, never mutated
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recording {
    pub id: String,

    /// Present only when the recording was captured during an emergency
    pub session_id: Option<String>,

    pub owner_id: String,
    pub payload: AudioPayload,

    /// Annotations supplied by the out-of-scope analysis service
    pub transcript: Option<String>,
    pub emotion_label: Option<String>,

    /// True only for uploads through the emergency-attach path
    pub is_emergency_recording: bool,

    pub created_at: DateTime<Utc>,
}

impl Recording {
    /// Listing view: everything except the payload bytes
    pub fn summary(&self) -> RecordingSummary {
        RecordingSummary {
            id: self.id.clone(),
            session_id: self.session_id.clone(),
            owner_id: self.owner_id.clone(),
            content_type: self.payload.content_type.clone(),
            size_bytes: self.payload.declared_size,
            transcript: self.transcript.clone(),
            emotion_label: self.emotion_label.clone(),
            is_emergency_recording: self.is_emergency_recording,
            created_at: self.created_at,
        }
    }
}

/// Recording metadata without the audio bytes, for listings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordingSummary {
    pub id: String,
    pub session_id: Option<String>,
    pub owner_id: String,
    pub content_type: String,
    pub size_bytes: u64,
    pub transcript: Option<String>,
    pub emotion_label: Option<String>,
    pub is_emergency_recording: bool,
    pub created_at: DateTime<Utc>,
}
