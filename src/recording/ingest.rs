use crate::directory::UserDirectory;
use crate::error::{CoreError, CoreResult};
use crate::model::{AudioPayload, Recording, RecordingSummary, User};
use crate::notify::ContactNotifier;
use crate::session::SessionManager;
use crate::store::RecordingStore;
use anyhow::{Context, Result};
use chrono::Utc;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::NamedTempFile;
use tracing::{info, warn};

/// Hard ceiling on stored audio payloads; the document backend caps
/// records at 16 MiB, so uploads stop just short of it
pub const MAX_RECORDING_BYTES: u64 = 15 * 1024 * 1024;

/// Most recordings returned by a single listing call
const LISTING_LIMIT: usize = 50;

/// One inbound audio upload
#[derive(Debug, Clone)]
pub struct IngestRequest {
    pub owner_id: String,

    /// Session to attach to; absent for routine-analysis uploads
    pub session_id: Option<String>,

    pub content_type: String,
    pub declared_size: u64,
    pub payload: Vec<u8>,

    /// Annotations from the analysis service, stored verbatim
    pub transcript: Option<String>,
    pub emotion_label: Option<String>,

    /// True when the upload arrived through the emergency-attach path
    pub emergency: bool,
}

/// Validates, stages and stores inbound audio artifacts
///
/// Inbound bytes are spooled to a staging file for the duration of the
/// transfer; the spool is released on every exit path, validation
/// failures included.
pub struct RecordingIngestor {
    recordings: Arc<dyn RecordingStore>,
    directory: Arc<dyn UserDirectory>,
    manager: Arc<SessionManager>,
    notifier: Arc<ContactNotifier>,
    staging_dir: PathBuf,
    max_payload_bytes: u64,
    tracking_base_url: String,
}

impl RecordingIngestor {
    pub fn new(
        recordings: Arc<dyn RecordingStore>,
        directory: Arc<dyn UserDirectory>,
        manager: Arc<SessionManager>,
        notifier: Arc<ContactNotifier>,
        staging_dir: PathBuf,
        max_payload_bytes: u64,
        tracking_base_url: String,
    ) -> Result<Self> {
        fs::create_dir_all(&staging_dir).context("Failed to create staging directory")?;

        Ok(Self {
            recordings,
            directory,
            manager,
            notifier,
            staging_dir,
            max_payload_bytes,
            tracking_base_url,
        })
    }

    /// Store one uploaded recording, link it to its session if any, and
    /// announce it. Returns the new recording id.
    pub async fn ingest(&self, req: IngestRequest) -> CoreResult<String> {
        // Spool the inbound transfer first; NamedTempFile removes the
        // file when dropped, whichever way this function exits.
        let mut staging = NamedTempFile::new_in(&self.staging_dir)
            .map_err(|e| CoreError::Unavailable(format!("staging file: {}", e)))?;
        staging
            .write_all(&req.payload)
            .map_err(|e| CoreError::Unavailable(format!("staging write: {}", e)))?;

        if req.payload.is_empty() {
            return Err(CoreError::NoPayload);
        }

        let size = req.declared_size.max(req.payload.len() as u64);
        if size > self.max_payload_bytes {
            return Err(CoreError::PayloadTooLarge {
                size,
                limit: self.max_payload_bytes,
            });
        }

        let owner = self
            .directory
            .find_user(&req.owner_id)
            .await?
            .ok_or_else(|| CoreError::InvalidOwner(req.owner_id.clone()))?;

        let data = fs::read(staging.path())
            .map_err(|e| CoreError::Unavailable(format!("staging read: {}", e)))?;

        let recording = Recording {
            id: format!("rec-{}", uuid::Uuid::new_v4()),
            session_id: req.session_id.clone(),
            owner_id: req.owner_id.clone(),
            payload: AudioPayload {
                content_type: req.content_type.clone(),
                declared_size: data.len() as u64,
                data,
            },
            transcript: req.transcript.clone(),
            emotion_label: req.emotion_label.clone(),
            is_emergency_recording: req.emergency,
            created_at: Utc::now(),
        };
        let recording_id = recording.id.clone();

        self.recordings.insert(recording).await?;
        drop(staging);

        info!(
            "recording {} stored ({} bytes, owner {})",
            recording_id,
            req.payload.len(),
            req.owner_id
        );

        if let Some(session_id) = &req.session_id {
            match self.manager.attach_recording(session_id, &recording_id).await {
                Ok(()) => {}
                Err(CoreError::SessionNotFound(_)) => {
                    warn!(
                        "recording {} references unknown session {}, stored unlinked",
                        recording_id, session_id
                    );
                }
                Err(e) => return Err(e),
            }
        }

        if req.emergency {
            self.alert_new_recording(&owner, &recording_id);
        }

        Ok(recording_id)
    }

    /// Owner's recordings, newest first, payload bytes excluded
    pub async fn list_recordings(&self, owner_id: &str) -> CoreResult<Vec<RecordingSummary>> {
        self.recordings.list_by_owner(owner_id, LISTING_LIMIT).await
    }

    /// Audio bytes plus declared media type, for playback
    pub async fn fetch_payload(&self, recording_id: &str) -> CoreResult<(String, Vec<u8>)> {
        let recording = self
            .recordings
            .get(recording_id)
            .await?
            .ok_or_else(|| CoreError::RecordingNotFound(recording_id.to_string()))?;

        Ok((recording.payload.content_type, recording.payload.data))
    }

    /// Owner-only deletion
    pub async fn delete_recording(
        &self,
        recording_id: &str,
        acting_user_id: &str,
    ) -> CoreResult<()> {
        let recording = self
            .recordings
            .get(recording_id)
            .await?
            .ok_or_else(|| CoreError::RecordingNotFound(recording_id.to_string()))?;

        if recording.owner_id != acting_user_id {
            return Err(CoreError::Forbidden(format!(
                "user {} does not own recording {}",
                acting_user_id, recording_id
            )));
        }

        self.recordings.delete(recording_id).await?;
        info!("recording {} deleted by owner", recording_id);

        Ok(())
    }

    fn alert_new_recording(&self, owner: &User, recording_id: &str) {
        let body = format!(
            "EMERGENCY UPDATE: New audio recording from {} is available: {}/recording/{}",
            owner.name, self.tracking_base_url, recording_id
        );
        self.notifier.dispatch(owner.contacts.clone(), body);
    }
}
