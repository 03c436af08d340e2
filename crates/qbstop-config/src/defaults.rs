//! Default values applied when the operator does not override them.
//!
//! # Design
//! - Shared between the CLI surface and the settings model so the two never drift.

/// Default qBittorrent host (scheme optional).
pub const DEFAULT_HOST: &str = "127.0.0.1";
/// Default qBittorrent Web UI port.
pub const DEFAULT_PORT: u16 = 8080;
/// Default number of polls per minute.
pub const DEFAULT_POLLS_PER_MINUTE: u32 = 1;
/// Upper bound on polls per minute (one poll per second).
pub const MAX_POLLS_PER_MINUTE: u32 = 60;
/// Default share ratio above which torrents are paused.
pub const DEFAULT_RATIO_LIMIT: f64 = 2.0;
/// Default per-attempt timeout for notification requests, in seconds.
pub const DEFAULT_NOTIFY_TIMEOUT_SECS: u64 = 10;
/// Scheme assumed when the host is given without one.
pub const DEFAULT_SCHEME: &str = "http";
