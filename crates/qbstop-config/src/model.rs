//! Raw operator settings and the validated configuration built from them.
//!
//! # Design
//! - `StopperSettings` mirrors the CLI surface and carries no guarantees.
//! - `StopperConfig` is immutable once built; the daemon never mutates it.

use std::fmt::{self, Debug, Formatter};
use std::str::FromStr;
use std::time::Duration;

use url::Url;

use crate::defaults::{
    DEFAULT_HOST, DEFAULT_NOTIFY_TIMEOUT_SECS, DEFAULT_POLLS_PER_MINUTE, DEFAULT_PORT,
    DEFAULT_RATIO_LIMIT,
};
use crate::error::{ConfigError, ConfigResult};
use crate::validate::{
    parse_base_url, poll_interval_from_rate, require_non_blank, validate_ratio_limit,
};

/// Unvalidated settings collected from the command line or environment.
#[derive(Clone)]
pub struct StopperSettings {
    /// qBittorrent host, optionally including a scheme.
    pub host: String,
    /// qBittorrent Web UI port.
    pub port: u16,
    /// Web UI username.
    pub username: String,
    /// Web UI password.
    pub password: String,
    /// Number of poll cycles per minute.
    pub polls_per_minute: u32,
    /// Share ratio above which torrents are paused.
    pub ratio_limit: f64,
    /// Optional Telegram notification settings.
    pub notify: NotifySettings,
}

impl Default for StopperSettings {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            username: String::new(),
            password: String::new(),
            polls_per_minute: DEFAULT_POLLS_PER_MINUTE,
            ratio_limit: DEFAULT_RATIO_LIMIT,
            notify: NotifySettings::default(),
        }
    }
}

impl Debug for StopperSettings {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("StopperSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("polls_per_minute", &self.polls_per_minute)
            .field("ratio_limit", &self.ratio_limit)
            .field("notify", &self.notify)
            .finish()
    }
}

/// Unvalidated Telegram settings; token and chat id must be given together.
#[derive(Clone)]
pub struct NotifySettings {
    /// Bot token issued by `BotFather`.
    pub bot_token: Option<String>,
    /// Target chat identifier.
    pub chat_id: Option<String>,
    /// Language used for message text.
    pub language: NotifyLanguage,
    /// Per-attempt request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for NotifySettings {
    fn default() -> Self {
        Self {
            bot_token: None,
            chat_id: None,
            language: NotifyLanguage::default(),
            timeout_secs: DEFAULT_NOTIFY_TIMEOUT_SECS,
        }
    }
}

impl Debug for NotifySettings {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("NotifySettings")
            .field("bot_token", &self.bot_token.as_ref().map(|_| "<redacted>"))
            .field("chat_id", &self.chat_id)
            .field("language", &self.language)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl NotifySettings {
    fn validate(self) -> ConfigResult<Option<NotifyConfig>> {
        let token = self.bot_token.filter(|value| !value.trim().is_empty());
        let chat_id = self.chat_id.filter(|value| !value.trim().is_empty());
        let (bot_token, chat_id) = match (token, chat_id) {
            (None, None) => return Ok(None),
            (Some(_), None) => return Err(ConfigError::IncompleteNotify { missing: "tg_cid" }),
            (None, Some(_)) => {
                return Err(ConfigError::IncompleteNotify {
                    missing: "tg_token",
                });
            }
            (Some(token), Some(chat_id)) => (token.trim().to_string(), chat_id.trim().to_string()),
        };
        if self.timeout_secs == 0 {
            return Err(ConfigError::InvalidField {
                field: "notify_timeout_secs",
                value: Some(self.timeout_secs.to_string()),
                reason: "zero",
            });
        }
        Ok(Some(NotifyConfig {
            bot_token,
            chat_id,
            language: self.language,
            request_timeout: Duration::from_secs(self.timeout_secs),
        }))
    }
}

impl StopperSettings {
    /// Validate the raw settings into an immutable configuration.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] encountered.
    pub fn validate(self) -> ConfigResult<StopperConfig> {
        let base_url = parse_base_url(&self.host, self.port)?;
        let username = require_non_blank(&self.username, "username")?;
        if self.password.is_empty() {
            return Err(ConfigError::MissingField { field: "password" });
        }
        let poll_interval = poll_interval_from_rate(self.polls_per_minute)?;
        let ratio_limit = validate_ratio_limit(self.ratio_limit)?;
        let notify = self.notify.validate()?;

        Ok(StopperConfig {
            manager: ManagerEndpoint { base_url },
            credentials: Credentials {
                username,
                password: self.password,
            },
            poll_interval,
            ratio_limit,
            notify,
        })
    }
}

/// Validated configuration consumed by the daemon core.
#[derive(Debug, Clone)]
pub struct StopperConfig {
    /// Location of the qBittorrent Web API.
    pub manager: ManagerEndpoint,
    /// Web UI credentials.
    pub credentials: Credentials,
    /// Delay between the end of one poll cycle and the start of the next.
    pub poll_interval: Duration,
    /// Share ratio above which torrents are paused.
    pub ratio_limit: f64,
    /// Telegram settings; `None` disables notifications.
    pub notify: Option<NotifyConfig>,
}

/// Root URL of the qBittorrent Web API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagerEndpoint {
    base_url: Url,
}

impl ManagerEndpoint {
    /// Wrap an already-normalised base URL.
    #[must_use]
    pub const fn new(base_url: Url) -> Self {
        Self { base_url }
    }

    /// Root URL that API paths are joined onto.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }
}

/// Web UI login credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Username.
    pub username: String,
    /// Password.
    pub password: String,
}

impl Debug for Credentials {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Validated Telegram notification settings.
#[derive(Clone)]
pub struct NotifyConfig {
    /// Bot token used in the `sendMessage` URL.
    pub bot_token: String,
    /// Target chat identifier.
    pub chat_id: String,
    /// Language used for message text.
    pub language: NotifyLanguage,
    /// Timeout applied to each delivery attempt.
    pub request_timeout: Duration,
}

impl Debug for NotifyConfig {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("NotifyConfig")
            .field("bot_token", &"<redacted>")
            .field("chat_id", &self.chat_id)
            .field("language", &self.language)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

/// Language of the notification text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NotifyLanguage {
    /// Simplified Chinese.
    #[default]
    Zh,
    /// English.
    En,
}

impl FromStr for NotifyLanguage {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "zh" | "zh-cn" | "cn" => Ok(Self::Zh),
            "en" | "en-us" => Ok(Self::En),
            _ => Err(ConfigError::InvalidField {
                field: "notify_language",
                value: Some(value.to_string()),
                reason: "unsupported_language",
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> StopperSettings {
        StopperSettings {
            username: "admin".to_string(),
            password: "adminadmin".to_string(),
            ..StopperSettings::default()
        }
    }

    #[test]
    fn defaults_validate_into_one_minute_interval() -> anyhow::Result<()> {
        let config = settings().validate()?;
        assert_eq!(
            config.manager.base_url().as_str(),
            "http://127.0.0.1:8080/"
        );
        assert_eq!(config.poll_interval, Duration::from_secs(60));
        assert!((config.ratio_limit - 2.0).abs() < f64::EPSILON);
        assert!(config.notify.is_none());
        assert_eq!(config.credentials.username, "admin");
        Ok(())
    }

    #[test]
    fn missing_credentials_are_rejected() {
        let mut raw = settings();
        raw.username = " ".to_string();
        assert!(matches!(
            raw.validate(),
            Err(ConfigError::MissingField { field: "username" })
        ));

        let mut raw = settings();
        raw.password = String::new();
        assert!(matches!(
            raw.validate(),
            Err(ConfigError::MissingField { field: "password" })
        ));
    }

    #[test]
    fn username_is_sent_as_typed() -> anyhow::Result<()> {
        let mut raw = settings();
        raw.username = " admin ".to_string();
        let config = raw.validate()?;
        assert_eq!(config.credentials.username, " admin ");
        Ok(())
    }

    #[test]
    fn notify_pair_is_co_required() -> anyhow::Result<()> {
        let mut raw = settings();
        raw.notify.bot_token = Some("123:abc".to_string());
        assert!(matches!(
            raw.validate(),
            Err(ConfigError::IncompleteNotify { missing: "tg_cid" })
        ));

        let mut raw = settings();
        raw.notify.chat_id = Some("42".to_string());
        assert!(matches!(
            raw.validate(),
            Err(ConfigError::IncompleteNotify {
                missing: "tg_token"
            })
        ));

        let mut raw = settings();
        raw.notify.bot_token = Some("123:abc".to_string());
        raw.notify.chat_id = Some("42".to_string());
        raw.notify.language = NotifyLanguage::En;
        let notify = raw
            .validate()?
            .notify
            .ok_or_else(|| anyhow::anyhow!("notify config expected"))?;
        assert_eq!(notify.bot_token, "123:abc");
        assert_eq!(notify.chat_id, "42");
        assert_eq!(notify.language, NotifyLanguage::En);
        assert_eq!(notify.request_timeout, Duration::from_secs(10));
        Ok(())
    }

    #[test]
    fn debug_output_redacts_secrets() -> anyhow::Result<()> {
        let mut raw = settings();
        raw.notify.bot_token = Some("123:secret-token".to_string());
        raw.notify.chat_id = Some("42".to_string());
        let rendered = format!("{raw:?}");
        assert!(!rendered.contains("adminadmin"));
        assert!(!rendered.contains("secret-token"));

        let config = raw.validate()?;
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("adminadmin"));
        assert!(!rendered.contains("secret-token"));
        Ok(())
    }

    #[test]
    fn notify_language_parses_codes() {
        assert_eq!("ZH".parse::<NotifyLanguage>().ok(), Some(NotifyLanguage::Zh));
        assert_eq!("en".parse::<NotifyLanguage>().ok(), Some(NotifyLanguage::En));
        assert!("fr".parse::<NotifyLanguage>().is_err());
    }
}
