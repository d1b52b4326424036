//! Live channel fabric for emergency sessions
//!
//! This module provides the real-time side of the pipeline:
//! - Topic-per-session publish/subscribe with bounded subscriber queues
//! - The ephemeral latest-location cache consulted by trackers
//!
//! Neither piece is durable. Anything that must survive a restart
//! belongs in the stores.

mod cache;
mod event;
mod topic;

pub use cache::{CachedLocation, LiveLocationCache};
pub use event::SessionEvent;
pub use topic::{LiveChannelBroker, Subscription};
