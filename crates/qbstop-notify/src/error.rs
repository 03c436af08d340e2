//! Error types for notification delivery.

use thiserror::Error;

/// Failure to construct the notifier or deliver a single message.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// The underlying HTTP client could not be created.
    #[error("failed to build HTTP client")]
    HttpClient {
        /// Source HTTP client error.
        source: reqwest::Error,
    },
    /// The Bot API base URL cannot carry a path.
    #[error("invalid bot API base URL")]
    InvalidApiBase {
        /// Base URL that was rejected.
        url: String,
    },
    /// The request timed out before a response arrived.
    #[error("notification request timed out")]
    Timeout {
        /// Source HTTP client error.
        source: reqwest::Error,
    },
    /// The request failed for a reason other than a timeout.
    #[error("notification request failed")]
    Transport {
        /// Source HTTP client error.
        source: reqwest::Error,
    },
    /// The Bot API answered `ok: false`.
    #[error("notification rejected by bot API")]
    Rejected {
        /// HTTP status code of the response.
        status: u16,
        /// Reason reported by the Bot API.
        description: Option<String>,
    },
    /// The response body was not a Bot API envelope.
    #[error("undecodable bot API response")]
    Decode {
        /// HTTP status code of the response.
        status: u16,
        /// Source HTTP client error.
        source: reqwest::Error,
    },
}

impl NotifyError {
    /// Whether another attempt may succeed; only timeouts qualify.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    pub(crate) fn from_send(source: reqwest::Error) -> Self {
        if source.is_timeout() {
            Self::Timeout { source }
        } else {
            Self::Transport { source }
        }
    }
}
