use super::{RecordingStore, ResolveOutcome, SessionStore};
use crate::error::CoreResult;
use crate::model::{EmergencySession, GeoPoint, Recording, RecordingSummary, SessionStatus};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// In-memory session store (session_id -> record)
#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<String, EmergencySession>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn insert(&self, session: EmergencySession) -> CoreResult<()> {
        let mut sessions = self.sessions.write().await;
        sessions.insert(session.id.clone(), session);
        Ok(())
    }

    async fn get(&self, session_id: &str) -> CoreResult<Option<EmergencySession>> {
        let sessions = self.sessions.read().await;
        Ok(sessions.get(session_id).cloned())
    }

    async fn resolve(
        &self,
        session_id: &str,
        resolved_at: DateTime<Utc>,
        last_location: Option<GeoPoint>,
    ) -> CoreResult<Option<ResolveOutcome>> {
        let mut sessions = self.sessions.write().await;

        let Some(session) = sessions.get_mut(session_id) else {
            return Ok(None);
        };

        if session.status == SessionStatus::Resolved {
            return Ok(Some(ResolveOutcome {
                session: session.clone(),
                transitioned: false,
            }));
        }

        session.status = SessionStatus::Resolved;
        session.resolved_at = Some(resolved_at);
        if last_location.is_some() {
            session.last_known_location = last_location;
        }

        Ok(Some(ResolveOutcome {
            session: session.clone(),
            transitioned: true,
        }))
    }

    async fn append_recording(&self, session_id: &str, recording_id: &str) -> CoreResult<bool> {
        let mut sessions = self.sessions.write().await;

        match sessions.get_mut(session_id) {
            Some(session) => {
                session.recording_ids.push(recording_id.to_string());
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// In-memory recording store (recording_id -> artifact)
#[derive(Default)]
pub struct InMemoryRecordingStore {
    recordings: RwLock<HashMap<String, Recording>>,
}

impl InMemoryRecordingStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordingStore for InMemoryRecordingStore {
    async fn insert(&self, recording: Recording) -> CoreResult<()> {
        let mut recordings = self.recordings.write().await;
        recordings.insert(recording.id.clone(), recording);
        Ok(())
    }

    async fn get(&self, recording_id: &str) -> CoreResult<Option<Recording>> {
        let recordings = self.recordings.read().await;
        Ok(recordings.get(recording_id).cloned())
    }

    async fn list_by_owner(
        &self,
        owner_id: &str,
        limit: usize,
    ) -> CoreResult<Vec<RecordingSummary>> {
        let recordings = self.recordings.read().await;

        let mut summaries: Vec<RecordingSummary> = recordings
            .values()
            .filter(|r| r.owner_id == owner_id)
            .map(Recording::summary)
            .collect();

        summaries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        summaries.truncate(limit);

        Ok(summaries)
    }

    async fn delete(&self, recording_id: &str) -> CoreResult<bool> {
        let mut recordings = self.recordings.write().await;
        Ok(recordings.remove(recording_id).is_some())
    }
}
