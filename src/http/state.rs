use crate::recording::RecordingIngestor;
use crate::session::SessionManager;
use std::sync::Arc;

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub manager: Arc<SessionManager>,
    pub ingestor: Arc<RecordingIngestor>,
}

impl AppState {
    pub fn new(manager: Arc<SessionManager>, ingestor: Arc<RecordingIngestor>) -> Self {
        Self { manager, ingestor }
    }
}
