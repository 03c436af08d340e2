//! Field validation helpers used when turning raw settings into a config.

use std::time::Duration;

use url::Url;

use crate::defaults::{DEFAULT_SCHEME, MAX_POLLS_PER_MINUTE};
use crate::error::{ConfigError, ConfigResult};

/// Build the manager base URL from a host (scheme optional) and port.
///
/// Any path, query or fragment on the host is discarded; API paths are joined
/// onto the returned root URL.
///
/// # Errors
///
/// Returns an error when the host is empty, cannot be parsed, or cannot carry
/// a port.
pub fn parse_base_url(host: &str, port: u16) -> ConfigResult<Url> {
    let host = host.trim();
    if host.is_empty() {
        return Err(ConfigError::MissingField { field: "host" });
    }
    if port == 0 {
        return Err(ConfigError::InvalidField {
            field: "port",
            value: Some(port.to_string()),
            reason: "zero",
        });
    }

    let raw = if host.contains("://") {
        host.to_string()
    } else {
        format!("{DEFAULT_SCHEME}://{host}")
    };
    let mut url = Url::parse(&raw).map_err(|source| ConfigError::InvalidUrl {
        value: host.to_string(),
        source,
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidField {
            field: "host",
            value: Some(host.to_string()),
            reason: "unsupported_scheme",
        });
    }
    url.set_port(Some(port))
        .map_err(|()| ConfigError::InvalidField {
            field: "host",
            value: Some(host.to_string()),
            reason: "cannot_carry_port",
        })?;
    url.set_path("/");
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}

/// Convert a polls-per-minute rate into the delay between poll cycles.
///
/// # Errors
///
/// Returns an error when the rate is zero or above one poll per second.
pub fn poll_interval_from_rate(polls_per_minute: u32) -> ConfigResult<Duration> {
    if !(1..=MAX_POLLS_PER_MINUTE).contains(&polls_per_minute) {
        return Err(ConfigError::InvalidField {
            field: "polling_times_per_minute",
            value: Some(polls_per_minute.to_string()),
            reason: "out_of_range",
        });
    }
    Ok(Duration::from_secs(60) / polls_per_minute)
}

/// Validate the share ratio limit.
///
/// # Errors
///
/// Returns an error when the limit is negative, NaN or infinite.
pub fn validate_ratio_limit(limit: f64) -> ConfigResult<f64> {
    if !limit.is_finite() || limit < 0.0 {
        return Err(ConfigError::InvalidField {
            field: "ratio",
            value: Some(limit.to_string()),
            reason: "not_finite_non_negative",
        });
    }
    Ok(limit)
}

/// Reject a blank required field; the value itself is kept as typed.
///
/// # Errors
///
/// Returns [`ConfigError::MissingField`] when the value is empty or whitespace.
pub fn require_non_blank(value: &str, field: &'static str) -> ConfigResult<String> {
    if value.trim().is_empty() {
        return Err(ConfigError::MissingField { field });
    }
    Ok(value.to_string())
}
