//! Durable persistence for sessions and recordings
//!
//! The pipeline talks to storage through these traits only. The
//! in-memory implementations back the binary and the test suite; a
//! document store implementation slots in without touching the
//! session manager.

mod memory;

pub use memory::{InMemoryRecordingStore, InMemorySessionStore};

use crate::error::CoreResult;
use crate::model::{EmergencySession, GeoPoint, Recording, RecordingSummary};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Result of a resolve attempt on an existing session
#[derive(Debug, Clone)]
pub struct ResolveOutcome {
    pub session: EmergencySession,

    /// True when this call performed the Active -> Resolved transition;
    /// false when the session was already terminal.
    pub transitioned: bool,
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn insert(&self, session: EmergencySession) -> CoreResult<()>;

    async fn get(&self, session_id: &str) -> CoreResult<Option<EmergencySession>>;

    /// Transition a session to Resolved, stamping `resolved_at` and
    /// flushing the last live location into the durable record. A
    /// second resolve of the same session is a no-op reported via
    /// [`ResolveOutcome::transitioned`]. `Ok(None)` for an unknown id.
    async fn resolve(
        &self,
        session_id: &str,
        resolved_at: DateTime<Utc>,
        last_location: Option<GeoPoint>,
    ) -> CoreResult<Option<ResolveOutcome>>;

    /// Append a recording reference to the session. Returns false for
    /// an unknown id. Appending to a resolved session is allowed: the
    /// upload may have been in flight when the session terminated.
    async fn append_recording(&self, session_id: &str, recording_id: &str) -> CoreResult<bool>;
}

#[async_trait]
pub trait RecordingStore: Send + Sync {
    async fn insert(&self, recording: Recording) -> CoreResult<()>;

    async fn get(&self, recording_id: &str) -> CoreResult<Option<Recording>>;

    /// Newest first, at most `limit` entries, payload bytes excluded
    async fn list_by_owner(&self, owner_id: &str, limit: usize)
        -> CoreResult<Vec<RecordingSummary>>;

    /// Returns false for an unknown id
    async fn delete(&self, recording_id: &str) -> CoreResult<bool>;
}
