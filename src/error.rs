//! Error taxonomy for the emergency pipeline
//!
//! Every boundary operation resolves to one of these variants. The HTTP
//! layer maps them onto status codes; nothing below the boundary needs
//! to know about HTTP.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    /// No session with this id, or the session is already resolved
    #[error("session not found: {0}")]
    SessionNotFound(String),

    /// No recording with this id
    #[error("recording not found: {0}")]
    RecordingNotFound(String),

    /// No user with this id in the directory
    #[error("user not found: {0}")]
    UserNotFound(String),

    /// Upload carried no audio bytes
    #[error("no audio payload supplied")]
    NoPayload,

    /// Upload exceeds the storage ceiling
    #[error("payload of {size} bytes exceeds the {limit} byte limit")]
    PayloadTooLarge { size: u64, limit: u64 },

    /// Recording owner does not resolve to a registered user
    #[error("recording owner {0} is not a registered user")]
    InvalidOwner(String),

    /// Malformed request data (bad coordinates, bad ids, ...)
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Acting user does not own the resource being mutated
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// A downstream collaborator (store, directory) is unreachable
    #[error("unavailable: {0}")]
    Unavailable(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
