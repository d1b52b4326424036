//! Audio artifact intake and retrieval
//!
//! Uploads are validated, spooled through a staging file, stored, and
//! — when tied to an emergency — linked to the session and announced
//! on its topic.

mod ingest;

pub use ingest::{IngestRequest, RecordingIngestor, MAX_RECORDING_BYTES};
