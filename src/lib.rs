pub mod broker;
pub mod config;
pub mod directory;
pub mod error;
pub mod http;
pub mod model;
pub mod notify;
pub mod recording;
pub mod session;
pub mod store;

pub use broker::{CachedLocation, LiveChannelBroker, LiveLocationCache, SessionEvent, Subscription};
pub use config::Config;
pub use directory::{InMemoryDirectory, UserDirectory};
pub use error::{CoreError, CoreResult};
pub use http::{create_router, AppState};
pub use model::{
    AudioPayload, Contact, EmergencySession, GeoPoint, Recording, RecordingSummary, SessionOwner,
    SessionStatus, User,
};
pub use notify::{ContactNotifier, GatewayError, LogGateway, MessagingGateway, NotifyOutcome};
pub use recording::{IngestRequest, RecordingIngestor, MAX_RECORDING_BYTES};
pub use session::{LocationReport, OwnerSummary, SessionManager};
pub use store::{
    InMemoryRecordingStore, InMemorySessionStore, RecordingStore, ResolveOutcome, SessionStore,
};
