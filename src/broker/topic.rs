use super::event::SessionEvent;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Events buffered per subscriber before the broker starts dropping
/// for that subscriber
const SUBSCRIBER_QUEUE_DEPTH: usize = 64;

struct SubscriberSlot {
    id: u64,
    tx: mpsc::Sender<SessionEvent>,
}

type TopicMap = HashMap<String, Vec<SubscriberSlot>>;

fn lock_topics(topics: &Mutex<TopicMap>) -> MutexGuard<'_, TopicMap> {
    topics.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Topic-per-session publish/subscribe fabric
///
/// Every subscriber gets its own bounded queue; publishing uses
/// `try_send` and never waits. A slow subscriber loses events (its
/// queue fills), a disconnected one is removed — neither can stall a
/// publisher. Events for one topic reach a given subscriber in publish
/// order.
pub struct LiveChannelBroker {
    topics: Arc<Mutex<TopicMap>>,
    next_subscriber_id: AtomicU64,
}

impl LiveChannelBroker {
    pub fn new() -> Self {
        Self {
            topics: Arc::new(Mutex::new(HashMap::new())),
            next_subscriber_id: AtomicU64::new(0),
        }
    }

    /// Join a session's topic. Events published while nobody holds the
    /// returned handle are not replayed.
    pub fn subscribe(&self, session_id: &str) -> Subscription {
        let id = self.next_subscriber_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::channel(SUBSCRIBER_QUEUE_DEPTH);

        let mut topics = lock_topics(&self.topics);
        topics
            .entry(session_id.to_string())
            .or_default()
            .push(SubscriberSlot { id, tx });

        debug!("subscriber {} joined topic {}", id, session_id);

        Subscription {
            session_id: session_id.to_string(),
            subscriber_id: id,
            rx,
            topics: Arc::downgrade(&self.topics),
        }
    }

    /// Deliver an event to every current subscriber of its topic.
    /// At-most-once: a full queue drops the event for that subscriber
    /// only, a closed queue drops the subscriber.
    pub fn publish(&self, event: SessionEvent) {
        let mut topics = lock_topics(&self.topics);

        let Some(slots) = topics.get_mut(event.session_id()) else {
            return;
        };

        slots.retain(|slot| match slot.tx.try_send(event.clone()) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!(
                    "subscriber {} on topic {} is lagging, dropped {}",
                    slot.id,
                    event.session_id(),
                    event.name()
                );
                true
            }
            Err(mpsc::error::TrySendError::Closed(_)) => false,
        });

        if slots.is_empty() {
            topics.remove(event.session_id());
        }
    }

    pub fn subscriber_count(&self, session_id: &str) -> usize {
        let topics = lock_topics(&self.topics);
        topics.get(session_id).map_or(0, Vec::len)
    }
}

impl Default for LiveChannelBroker {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle to one topic membership; dropping it unsubscribes
pub struct Subscription {
    session_id: String,
    subscriber_id: u64,
    rx: mpsc::Receiver<SessionEvent>,
    topics: Weak<Mutex<TopicMap>>,
}

impl Subscription {
    /// Next event for this topic; pends until one arrives, `None` once
    /// the broker is gone
    pub async fn recv(&mut self) -> Option<SessionEvent> {
        self.rx.recv().await
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let Some(topics) = self.topics.upgrade() else {
            return;
        };

        let mut topics = lock_topics(&topics);
        if let Some(slots) = topics.get_mut(&self.session_id) {
            slots.retain(|slot| slot.id != self.subscriber_id);
            if slots.is_empty() {
                topics.remove(&self.session_id);
            }
        }

        debug!(
            "subscriber {} left topic {}",
            self.subscriber_id, self.session_id
        );
    }
}
