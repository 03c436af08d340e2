//! Cookie session captured from a successful login.

use std::fmt::{self, Debug, Formatter};

use reqwest::header::{HeaderMap, SET_COOKIE};

/// Opaque authentication state returned by `/api/v2/auth/login`.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    cookie: String,
}

impl Session {
    /// Capture the session from the login response headers.
    ///
    /// Every `Set-Cookie` header contributes its leading `name=value` pair;
    /// attributes such as `path` or `HttpOnly` are dropped. Returns `None`
    /// when no usable cookie was issued, which qBittorrent uses to signal
    /// rejected credentials.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let pairs: Vec<&str> = headers
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .filter_map(|value| value.split(';').next())
            .map(str::trim)
            .filter(|pair| {
                pair.split_once('=')
                    .is_some_and(|(name, value)| !name.trim().is_empty() && !value.is_empty())
            })
            .collect();
        if pairs.is_empty() {
            return None;
        }
        Some(Self {
            cookie: pairs.join("; "),
        })
    }

    /// Value for the `Cookie` request header.
    #[must_use]
    pub fn cookie_header(&self) -> &str {
        &self.cookie
    }
}

impl Debug for Session {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str("Session(<redacted>)")
    }
}
