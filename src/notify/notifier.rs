use super::gateway::MessagingGateway;
use crate::model::Contact;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{info, warn};

/// Result of one best-effort contact notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifyOutcome {
    Sent { message_id: String },
    Failed { reason: String },
    TimedOut,
}

impl NotifyOutcome {
    pub fn is_sent(&self) -> bool {
        matches!(self, NotifyOutcome::Sent { .. })
    }
}

/// Best-effort alert dispatch to emergency contacts
///
/// Failures stop here: a gateway error or timeout for one contact is
/// logged and reported as an outcome, never as an error. The operation
/// that triggered the alert succeeds no matter how many contacts were
/// reached. No retries, no state.
pub struct ContactNotifier {
    gateway: Arc<dyn MessagingGateway>,
    send_timeout: Duration,
}

impl ContactNotifier {
    pub fn new(gateway: Arc<dyn MessagingGateway>, send_timeout: Duration) -> Self {
        Self {
            gateway,
            send_timeout,
        }
    }

    /// Send one alert, bounded by the configured timeout
    pub async fn notify(&self, contact: &Contact, body: &str) -> NotifyOutcome {
        match timeout(self.send_timeout, self.gateway.send(&contact.phone, body)).await {
            Ok(Ok(message_id)) => {
                info!("alert delivered to {} ({})", contact.name, message_id);
                NotifyOutcome::Sent { message_id }
            }
            Ok(Err(e)) => {
                warn!("failed to alert {} at {}: {}", contact.name, contact.phone, e);
                NotifyOutcome::Failed {
                    reason: e.to_string(),
                }
            }
            Err(_) => {
                warn!(
                    "alert to {} timed out after {:?}",
                    contact.phone, self.send_timeout
                );
                NotifyOutcome::TimedOut
            }
        }
    }

    /// Fire-and-forget fan-out: one concurrent send per contact,
    /// detached from the caller. The spawned task only aggregates
    /// outcomes for logging; every branch is already timeout-bounded.
    pub fn dispatch(&self, contacts: Vec<Contact>, body: String) {
        if contacts.is_empty() {
            return;
        }

        let notifier = Self {
            gateway: Arc::clone(&self.gateway),
            send_timeout: self.send_timeout,
        };
        tokio::spawn(async move {
            let sends = contacts.iter().map(|c| notifier.notify(c, &body));
            let outcomes = futures::future::join_all(sends).await;

            let sent = outcomes.iter().filter(|o| o.is_sent()).count();
            info!(
                "alert dispatch complete: {}/{} contacts reached",
                sent,
                contacts.len()
            );
        });
    }
}
