//! Error types for torrent manager operations.

use std::error::Error;

use thiserror::Error;

/// Primary error type for torrent manager operations.
#[derive(Debug, Error)]
pub enum ManagerError {
    /// The manager accepted the login request but did not issue a session.
    #[error("invalid credentials")]
    InvalidCredentials {
        /// Username that was rejected.
        username: String,
    },
    /// An authenticated call was refused because the session is gone.
    #[error("session expired")]
    SessionExpired {
        /// Operation identifier.
        operation: &'static str,
    },
    /// The manager answered with a status the caller does not handle.
    #[error("unexpected response status")]
    UnexpectedStatus {
        /// Operation identifier.
        operation: &'static str,
        /// HTTP status code returned by the manager.
        status: u16,
    },
    /// The request never produced a response.
    #[error("transport failure")]
    Transport {
        /// Operation identifier.
        operation: &'static str,
        /// Underlying transport failure.
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    /// The response body could not be decoded.
    #[error("response decode failure")]
    Decode {
        /// Operation identifier.
        operation: &'static str,
        /// Underlying decode failure.
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
}

impl ManagerError {
    /// Whether this error only means the session must be re-established.
    #[must_use]
    pub const fn is_session_expired(&self) -> bool {
        matches!(self, Self::SessionExpired { .. })
    }
}

/// Convenience alias for torrent manager results.
pub type ManagerResult<T> = Result<T, ManagerError>;
