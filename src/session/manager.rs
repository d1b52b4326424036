use super::report::{LocationReport, OwnerSummary};
use crate::broker::{
    CachedLocation, LiveChannelBroker, LiveLocationCache, SessionEvent, Subscription,
};
use crate::directory::UserDirectory;
use crate::error::{CoreError, CoreResult};
use crate::model::{EmergencySession, GeoPoint, SessionOwner, User};
use crate::notify::ContactNotifier;
use crate::store::SessionStore;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{info, warn};

/// Orchestrates the emergency session lifecycle
///
/// Sole writer of session state. Composes the store (durable record),
/// the live cache (current location), the broker (tracker fan-out) and
/// the notifier (contact alerts). No transaction spans the store and
/// the broker; the two may briefly disagree and callers tolerate that.
pub struct SessionManager {
    store: Arc<dyn SessionStore>,
    directory: Arc<dyn UserDirectory>,
    notifier: Arc<ContactNotifier>,
    broker: Arc<LiveChannelBroker>,
    cache: Arc<LiveLocationCache>,
    tracking_base_url: String,
}

impl SessionManager {
    pub fn new(
        store: Arc<dyn SessionStore>,
        directory: Arc<dyn UserDirectory>,
        notifier: Arc<ContactNotifier>,
        broker: Arc<LiveChannelBroker>,
        cache: Arc<LiveLocationCache>,
        tracking_base_url: String,
    ) -> Self {
        Self {
            store,
            directory,
            notifier,
            broker,
            cache,
            tracking_base_url,
        }
    }

    /// Open a new emergency session and alert the owner's contacts.
    ///
    /// The record is persisted even for anonymous or unknown owners —
    /// an SOS is never dropped because the sender has no account.
    /// Alert dispatch is fire-and-forget; this returns as soon as the
    /// record is durable, and succeeds even if every alert fails.
    pub async fn create_session(
        &self,
        owner: SessionOwner,
        initial_location: Option<GeoPoint>,
    ) -> CoreResult<String> {
        if let Some(location) = &initial_location {
            Self::check_location(location)?;
        }

        let session = EmergencySession::new(owner.clone(), initial_location);
        let session_id = session.id.clone();
        self.store.insert(session).await?;

        info!("emergency session {} opened", session_id);

        if let SessionOwner::Owned { user_id } = &owner {
            if let Some(user) = self.lookup_owner(user_id, &session_id).await {
                let body = format!(
                    "EMERGENCY: {} has sent an SOS! Track their location: {}/track/{}",
                    user.name, self.tracking_base_url, session_id
                );
                self.notifier.dispatch(user.contacts, body);
            }
        }

        Ok(session_id)
    }

    /// Ingest a location tick from the owning device.
    ///
    /// Last write wins: no ordering check against `observed_at`, so an
    /// out-of-order delivery can regress the displayed position. The
    /// durable record is not touched here; it catches up on
    /// cancellation.
    pub async fn update_location(
        &self,
        session_id: &str,
        location: GeoPoint,
        observed_at: DateTime<Utc>,
    ) -> CoreResult<()> {
        Self::check_location(&location)?;

        if self.cache.get(session_id).await.is_none() {
            match self.store.get(session_id).await? {
                Some(session) if session.is_active() => {}
                _ => return Err(CoreError::SessionNotFound(session_id.to_string())),
            }
        }

        self.cache
            .set(
                session_id,
                CachedLocation {
                    location,
                    observed_at,
                    updated_at: Utc::now(),
                },
            )
            .await;

        // Re-check after the write: a racing cancellation must not be
        // left with a stale cache entry it already evicted.
        match self.store.get(session_id).await? {
            Some(session) if session.is_active() => {}
            _ => {
                self.cache.evict(session_id).await;
                return Err(CoreError::SessionNotFound(session_id.to_string()));
            }
        }

        self.broker.publish(SessionEvent::LocationUpdated {
            session_id: session_id.to_string(),
            location,
            observed_at,
        });

        Ok(())
    }

    /// Resolve an emergency. Idempotent: cancelling an already-resolved
    /// session is a no-op success. The first cancellation flushes the
    /// live location into the durable record, evicts the cache,
    /// publishes the terminal event and re-notifies contacts.
    pub async fn cancel_session(
        &self,
        session_id: &str,
        acting_user_id: Option<&str>,
    ) -> CoreResult<()> {
        let cached = self.cache.get(session_id).await.map(|c| c.location);
        let resolved_at = Utc::now();

        if let (Some(acting), Some(session)) =
            (acting_user_id, self.store.get(session_id).await?)
        {
            if let Some(owner_id) = session.owner.user_id() {
                if owner_id != acting {
                    return Err(CoreError::Forbidden(format!(
                        "user {} does not own session {}",
                        acting, session_id
                    )));
                }
            }
        }

        let outcome = self
            .store
            .resolve(session_id, resolved_at, cached)
            .await?
            .ok_or_else(|| CoreError::SessionNotFound(session_id.to_string()))?;

        self.cache.evict(session_id).await;

        if !outcome.transitioned {
            return Ok(());
        }

        info!("emergency session {} cancelled", session_id);

        self.broker.publish(SessionEvent::Cancelled {
            session_id: session_id.to_string(),
            at: resolved_at,
        });

        if let Some(user_id) = outcome.session.owner.user_id() {
            if let Some(user) = self.lookup_owner(user_id, session_id).await {
                let body = format!(
                    "EMERGENCY CANCELLED: {}'s emergency alert has been cancelled.",
                    user.name
                );
                self.notifier.dispatch(user.contacts, body);
            }
        }

        Ok(())
    }

    /// Current position for trackers. The live cache wins; the durable
    /// record is the fallback for a tracker joining after a restart or
    /// before the first tick, and carries the owner summary.
    pub async fn current_location(&self, session_id: &str) -> CoreResult<LocationReport> {
        if let Some(cached) = self.cache.get(session_id).await {
            return Ok(LocationReport {
                location: Some(cached.location),
                observed_at: Some(cached.observed_at),
                last_updated: cached.updated_at,
                owner: None,
            });
        }

        let session = self
            .store
            .get(session_id)
            .await?
            .ok_or_else(|| CoreError::SessionNotFound(session_id.to_string()))?;

        let owner = match session.owner.user_id() {
            Some(user_id) => self
                .lookup_owner(user_id, session_id)
                .await
                .map(|user| OwnerSummary {
                    name: user.name,
                    phone: user.phone,
                }),
            None => None,
        };

        Ok(LocationReport {
            location: session.last_known_location,
            observed_at: None,
            last_updated: session.resolved_at.unwrap_or(session.created_at),
            owner,
        })
    }

    /// Link a stored recording to a session and announce it on the
    /// topic. Allowed shortly after resolution: the upload may have
    /// been in flight when the session terminated.
    pub async fn attach_recording(&self, session_id: &str, recording_id: &str) -> CoreResult<()> {
        let linked = self.store.append_recording(session_id, recording_id).await?;
        if !linked {
            return Err(CoreError::SessionNotFound(session_id.to_string()));
        }

        self.broker.publish(SessionEvent::RecordingAdded {
            session_id: session_id.to_string(),
            recording_id: recording_id.to_string(),
            at: Utc::now(),
        });

        Ok(())
    }

    /// Durable record lookup, for tracker bootstrap
    pub async fn session(&self, session_id: &str) -> CoreResult<EmergencySession> {
        self.store
            .get(session_id)
            .await?
            .ok_or_else(|| CoreError::SessionNotFound(session_id.to_string()))
    }

    /// Join the session's live topic
    pub fn subscribe(&self, session_id: &str) -> Subscription {
        self.broker.subscribe(session_id)
    }

    pub fn broker(&self) -> &Arc<LiveChannelBroker> {
        &self.broker
    }

    /// Directory lookup that never fails the caller: alerting is
    /// best-effort, and an unreachable directory must not take a
    /// session operation down with it.
    async fn lookup_owner(&self, user_id: &str, session_id: &str) -> Option<User> {
        match self.directory.find_user(user_id).await {
            Ok(Some(user)) => Some(user),
            Ok(None) => {
                warn!(
                    "session {} owner {} is not a registered user, skipping alerts",
                    session_id, user_id
                );
                None
            }
            Err(e) => {
                warn!("contact lookup failed for session {}: {}", session_id, e);
                None
            }
        }
    }

    fn check_location(location: &GeoPoint) -> CoreResult<()> {
        if !location.is_valid() {
            return Err(CoreError::InvalidInput(format!(
                "coordinates out of range: ({}, {})",
                location.latitude, location.longitude
            )));
        }
        Ok(())
    }
}
