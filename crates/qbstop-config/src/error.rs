//! Error types for configuration validation.

use thiserror::Error;

/// Primary error type for configuration validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Field contained an invalid value.
    #[error("invalid configuration field")]
    InvalidField {
        /// Field that failed validation.
        field: &'static str,
        /// Offending value when it is safe to report.
        value: Option<String>,
        /// Machine-readable reason for the failure.
        reason: &'static str,
    },
    /// A required field was empty.
    #[error("missing configuration field")]
    MissingField {
        /// Field that was missing.
        field: &'static str,
    },
    /// Only one half of the notification token/chat pair was supplied.
    #[error("incomplete notification configuration")]
    IncompleteNotify {
        /// Field that was absent.
        missing: &'static str,
    },
    /// The manager host could not be turned into a URL.
    #[error("invalid manager URL")]
    InvalidUrl {
        /// Host value provided by the operator.
        value: String,
        /// Underlying parse error.
        source: url::ParseError,
    },
}

/// Convenience alias for configuration results.
pub type ConfigResult<T> = Result<T, ConfigError>;
