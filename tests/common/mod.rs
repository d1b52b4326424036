//! Shared harness for integration tests: a fully wired pipeline with
//! in-memory stores and controllable gateway doubles.

// Not every test binary touches every helper
#![allow(dead_code)]

use async_trait::async_trait;
use beacon_sos::{
    Contact, ContactNotifier, GatewayError, InMemoryDirectory, InMemoryRecordingStore,
    InMemorySessionStore, LiveChannelBroker, LiveLocationCache, MessagingGateway,
    RecordingIngestor, SessionManager, User, MAX_RECORDING_BYTES,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Gateway double that records every send
#[derive(Default)]
pub struct RecordingGateway {
    pub calls: Mutex<Vec<(String, String)>>,
}

#[async_trait]
impl MessagingGateway for RecordingGateway {
    async fn send(&self, to_phone: &str, body: &str) -> Result<String, GatewayError> {
        let mut calls = self.calls.lock().await;
        calls.push((to_phone.to_string(), body.to_string()));
        Ok(format!("test-{}", calls.len()))
    }
}

impl RecordingGateway {
    /// Poll until at least `n` sends landed; dispatch is fire-and-forget
    /// so tests have to wait for the detached tasks.
    pub async fn wait_for_calls(&self, n: usize) -> Vec<(String, String)> {
        for _ in 0..200 {
            {
                let calls = self.calls.lock().await;
                if calls.len() >= n {
                    return calls.clone();
                }
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        let calls = self.calls.lock().await;
        calls.clone()
    }
}

/// Gateway double standing in for a provider outage
pub struct FailingGateway;

#[async_trait]
impl MessagingGateway for FailingGateway {
    async fn send(&self, _to_phone: &str, _body: &str) -> Result<String, GatewayError> {
        Err(GatewayError::Unreachable("gateway down".to_string()))
    }
}

pub struct Pipeline {
    pub manager: Arc<SessionManager>,
    pub ingestor: Arc<RecordingIngestor>,
    pub directory: Arc<InMemoryDirectory>,
    pub broker: Arc<LiveChannelBroker>,
    pub cache: Arc<LiveLocationCache>,
    pub staging: tempfile::TempDir,
}

pub fn build_pipeline(gateway: Arc<dyn MessagingGateway>) -> Pipeline {
    let sessions = Arc::new(InMemorySessionStore::new());
    let recordings = Arc::new(InMemoryRecordingStore::new());
    let directory = Arc::new(InMemoryDirectory::new());
    let notifier = Arc::new(ContactNotifier::new(gateway, Duration::from_millis(500)));
    let broker = Arc::new(LiveChannelBroker::new());
    let cache = Arc::new(LiveLocationCache::new());
    let staging = tempfile::tempdir().expect("staging dir");

    let manager = Arc::new(SessionManager::new(
        sessions,
        directory.clone(),
        notifier.clone(),
        broker.clone(),
        cache.clone(),
        "http://localhost:3000".to_string(),
    ));

    let ingestor = Arc::new(
        RecordingIngestor::new(
            recordings,
            directory.clone(),
            manager.clone(),
            notifier,
            staging.path().to_path_buf(),
            MAX_RECORDING_BYTES,
            "http://localhost:3000".to_string(),
        )
        .expect("ingestor"),
    );

    Pipeline {
        manager,
        ingestor,
        directory,
        broker,
        cache,
        staging,
    }
}

pub fn contact(name: &str, phone: &str) -> Contact {
    Contact {
        name: name.to_string(),
        phone: phone.to_string(),
    }
}

pub fn user(id: &str, name: &str, contacts: Vec<Contact>) -> User {
    User {
        id: id.to_string(),
        name: name.to_string(),
        phone: "+1-555-0000".to_string(),
        contacts,
    }
}
