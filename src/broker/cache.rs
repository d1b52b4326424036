use crate::model::GeoPoint;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Last observed position for one active session
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CachedLocation {
    pub location: GeoPoint,

    /// Instant declared by the reporting device
    pub observed_at: DateTime<Utc>,

    /// Instant the update was accepted here
    pub updated_at: DateTime<Utc>,
}

/// Process-memory latest-location store
///
/// Source of truth for "current location" while a session is active.
/// Entries appear on the first location update, disappear on
/// cancellation, and do not survive a restart — the durable record's
/// `last_known_location` is the slower shadow used after one.
///
/// Writes are last-write-wins: an out-of-order update overwrites a
/// newer observation. No ordering check is made against `observed_at`.
#[derive(Default)]
pub struct LiveLocationCache {
    entries: RwLock<HashMap<String, CachedLocation>>,
}

impl LiveLocationCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, session_id: &str) -> Option<CachedLocation> {
        let entries = self.entries.read().await;
        entries.get(session_id).copied()
    }

    pub async fn set(&self, session_id: &str, entry: CachedLocation) {
        let mut entries = self.entries.write().await;
        entries.insert(session_id.to_string(), entry);
    }

    /// Returns true when an entry was present
    pub async fn evict(&self, session_id: &str) -> bool {
        let mut entries = self.entries.write().await;
        entries.remove(session_id).is_some()
    }

    pub async fn len(&self) -> usize {
        let entries = self.entries.read().await;
        entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
