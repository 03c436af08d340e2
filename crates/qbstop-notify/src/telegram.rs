//! Telegram Bot API notifier.
//!
//! # Design
//! - One `sendMessage` call per paused torrent, at most [`MAX_ATTEMPTS`] tries.
//! - Only timeouts are retried; a rejection or connection failure is final.
//! - Failures end in a log line and never reach the poll loop.

use async_trait::async_trait;
use qbstop_config::{NotifyConfig, NotifyLanguage};
use qbstop_torrent_core::{PauseNotifier, TorrentSnapshot};
use reqwest::{Client, Url};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::NotifyError;
use crate::message::render_message;

/// Public Bot API root.
pub const TELEGRAM_API_BASE: &str = "https://api.telegram.org/";
/// Total delivery attempts per notice.
pub const MAX_ATTEMPTS: u32 = 3;

#[derive(Debug, Deserialize)]
struct BotResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// Sends pause notices to a Telegram chat.
#[derive(Debug, Clone)]
pub struct TelegramNotifier {
    http: Client,
    send_url: Url,
    chat_id: String,
    language: NotifyLanguage,
}

impl TelegramNotifier {
    /// Build a notifier that talks to the public Bot API.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: &NotifyConfig) -> Result<Self, NotifyError> {
        let api_base = Url::parse(TELEGRAM_API_BASE).map_err(|_| NotifyError::InvalidApiBase {
            url: TELEGRAM_API_BASE.to_string(),
        })?;
        Self::with_api_base(config, &api_base)
    }

    /// Build a notifier against an alternative Bot API root.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created or the base URL
    /// cannot carry a path.
    pub fn with_api_base(config: &NotifyConfig, api_base: &Url) -> Result<Self, NotifyError> {
        let http = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|source| NotifyError::HttpClient { source })?;

        let mut send_url = api_base.clone();
        send_url
            .path_segments_mut()
            .map_err(|()| NotifyError::InvalidApiBase {
                url: api_base.to_string(),
            })?
            .pop_if_empty()
            .push(&format!("bot{}", config.bot_token))
            .push("sendMessage");

        Ok(Self {
            http,
            send_url,
            chat_id: config.chat_id.clone(),
            language: config.language,
        })
    }

    /// Make a single `sendMessage` call.
    ///
    /// # Errors
    ///
    /// Returns the classified failure; see [`NotifyError::is_retryable`].
    pub async fn send_once(&self, text: &str) -> Result<(), NotifyError> {
        let response = self
            .http
            .post(self.send_url.clone())
            .form(&[("chat_id", self.chat_id.as_str()), ("text", text)])
            .send()
            .await
            .map_err(NotifyError::from_send)?;

        let status = response.status().as_u16();
        let body = response
            .json::<BotResponse>()
            .await
            .map_err(|source| {
                if source.is_timeout() {
                    NotifyError::Timeout { source }
                } else {
                    NotifyError::Decode { status, source }
                }
            })?;

        if body.ok {
            Ok(())
        } else {
            Err(NotifyError::Rejected {
                status,
                description: body.description,
            })
        }
    }

    /// Deliver the notice for `torrent`, retrying timeouts.
    ///
    /// Returns the number of attempts used on success.
    ///
    /// # Errors
    ///
    /// Returns the last failure once retries are exhausted or a
    /// non-retryable failure occurs.
    pub async fn deliver(&self, torrent: &TorrentSnapshot) -> Result<u32, NotifyError> {
        let text = render_message(self.language, torrent);
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.send_once(&text).await {
                Ok(()) => return Ok(attempt),
                Err(err) if err.is_retryable() && attempt < MAX_ATTEMPTS => {
                    warn!(
                        torrent = %torrent.name,
                        attempt,
                        error = %err,
                        "telegram request timed out; retrying"
                    );
                }
                Err(err) => return Err(err),
            }
        }
    }
}

#[async_trait]
impl PauseNotifier for TelegramNotifier {
    async fn notify(&self, torrent: &TorrentSnapshot) {
        match self.deliver(torrent).await {
            Ok(attempts) => debug!(torrent = %torrent.name, attempts, "telegram notice sent"),
            Err(NotifyError::Rejected {
                status,
                description,
            }) => warn!(
                torrent = %torrent.name,
                status,
                reason = description.as_deref().unwrap_or("unknown"),
                "telegram rejected notice"
            ),
            Err(err) => warn!(
                torrent = %torrent.name,
                error = %err,
                "failed to send telegram notice"
            ),
        }
    }
}
