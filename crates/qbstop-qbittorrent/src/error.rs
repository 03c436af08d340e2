//! Errors raised while constructing the API client.

use thiserror::Error;

/// Failure to assemble a [`crate::QbitClient`].
#[derive(Debug, Error)]
pub enum BuildError {
    /// The underlying HTTP client could not be created.
    #[error("failed to build HTTP client")]
    HttpClient {
        /// Source HTTP client error.
        source: reqwest::Error,
    },
    /// An API path could not be joined onto the base URL.
    #[error("invalid API endpoint")]
    Endpoint {
        /// Relative API path.
        path: &'static str,
        /// Underlying URL error.
        source: url::ParseError,
    },
}
