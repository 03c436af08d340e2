//! # Design
//!
//! - Centralize application-level errors for bootstrap and the poll loop.
//! - Keep error messages constant while carrying context fields for debugging.
//! - Preserve source errors without re-logging at call sites.

use thiserror::Error;

/// Result alias for application operations.
pub type AppResult<T> = Result<T, AppError>;

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration validation failed.
    #[error("configuration operation failed")]
    Config {
        /// Operation identifier.
        operation: &'static str,
        /// Source configuration error.
        source: qbstop_config::ConfigError,
    },
    /// Telemetry operations failed.
    #[error("telemetry operation failed")]
    Telemetry {
        /// Operation identifier.
        operation: &'static str,
        /// Source telemetry error.
        source: qbstop_telemetry::TelemetryError,
    },
    /// The qBittorrent client could not be constructed.
    #[error("qbittorrent client construction failed")]
    ManagerClient {
        /// Operation identifier.
        operation: &'static str,
        /// Source build error.
        source: qbstop_qbittorrent::BuildError,
    },
    /// The notifier could not be constructed.
    #[error("notifier construction failed")]
    Notifier {
        /// Operation identifier.
        operation: &'static str,
        /// Source notifier error.
        source: qbstop_notify::NotifyError,
    },
    /// A torrent manager call failed and could not be recovered.
    #[error("torrent manager operation failed")]
    Manager {
        /// Operation identifier.
        operation: &'static str,
        /// Source manager error.
        source: qbstop_torrent_core::ManagerError,
    },
}

impl AppError {
    pub(crate) const fn config(
        operation: &'static str,
        source: qbstop_config::ConfigError,
    ) -> Self {
        Self::Config { operation, source }
    }

    pub(crate) const fn telemetry(
        operation: &'static str,
        source: qbstop_telemetry::TelemetryError,
    ) -> Self {
        Self::Telemetry { operation, source }
    }

    pub(crate) const fn manager_client(
        operation: &'static str,
        source: qbstop_qbittorrent::BuildError,
    ) -> Self {
        Self::ManagerClient { operation, source }
    }

    pub(crate) const fn notifier(
        operation: &'static str,
        source: qbstop_notify::NotifyError,
    ) -> Self {
        Self::Notifier { operation, source }
    }

    pub(crate) const fn manager(
        operation: &'static str,
        source: qbstop_torrent_core::ManagerError,
    ) -> Self {
        Self::Manager { operation, source }
    }
}
