//! Command-line surface for the daemon.
//!
//! Every flag can also be supplied through a `QBSTOP_*` environment variable.

use clap::Parser;
use qbstop_config::defaults::{
    DEFAULT_HOST, DEFAULT_NOTIFY_TIMEOUT_SECS, DEFAULT_POLLS_PER_MINUTE, DEFAULT_PORT,
    DEFAULT_RATIO_LIMIT, MAX_POLLS_PER_MINUTE,
};
use qbstop_config::{NotifyLanguage, NotifySettings, StopperSettings};
use qbstop_telemetry::LogFormat;

/// Pause qBittorrent torrents once their share ratio passes a limit.
#[derive(Parser)]
#[command(name = "qbstop", version, about)]
pub struct Cli {
    /// qBittorrent Web UI host; may include an `http://` or `https://` scheme.
    #[arg(long, env = "QBSTOP_HOST", default_value = DEFAULT_HOST)]
    host: String,
    /// qBittorrent Web UI port.
    #[arg(long, env = "QBSTOP_PORT", default_value_t = DEFAULT_PORT)]
    port: u16,
    /// Web UI username.
    #[arg(short = 'u', long, env = "QBSTOP_USERNAME")]
    username: String,
    /// Web UI password.
    #[arg(short = 'p', long, env = "QBSTOP_PASSWORD", hide_env_values = true)]
    password: String,
    /// Poll cycles per minute (1 to 60).
    #[arg(
        short = 't',
        long = "polling-times-per-minute",
        env = "QBSTOP_POLLS_PER_MINUTE",
        default_value_t = DEFAULT_POLLS_PER_MINUTE,
        value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_POLLS_PER_MINUTE))
    )]
    polls_per_minute: u32,
    /// Share ratio above which a seeding torrent is paused.
    #[arg(short = 'r', long, env = "QBSTOP_RATIO", default_value_t = DEFAULT_RATIO_LIMIT)]
    ratio: f64,
    /// Telegram bot token; requires `--tg-cid`.
    #[arg(
        long,
        env = "QBSTOP_TG_TOKEN",
        hide_env_values = true,
        requires = "tg_cid"
    )]
    tg_token: Option<String>,
    /// Telegram chat id; requires `--tg-token`.
    #[arg(long, env = "QBSTOP_TG_CID", requires = "tg_token")]
    tg_cid: Option<String>,
    /// Language of Telegram notices (`zh` or `en`).
    #[arg(
        long,
        env = "QBSTOP_NOTIFY_LANGUAGE",
        default_value = "zh",
        value_parser = parse_language
    )]
    notify_language: NotifyLanguage,
    /// Per-attempt Telegram request timeout in seconds.
    #[arg(long, env = "QBSTOP_NOTIFY_TIMEOUT_SECS", default_value_t = DEFAULT_NOTIFY_TIMEOUT_SECS)]
    notify_timeout_secs: u64,
    /// Log output format (`json` or `pretty`); inferred from the build when unset.
    #[arg(long, env = "QBSTOP_LOG_FORMAT", value_parser = parse_log_format)]
    log_format: Option<LogFormat>,
}

impl Cli {
    /// Log format requested on the command line, falling back to the build default.
    #[must_use]
    pub fn log_format(&self) -> LogFormat {
        self.log_format.unwrap_or_else(LogFormat::infer)
    }

    /// Convert the parsed flags into raw settings for validation.
    #[must_use]
    pub fn into_settings(self) -> StopperSettings {
        StopperSettings {
            host: self.host,
            port: self.port,
            username: self.username,
            password: self.password,
            polls_per_minute: self.polls_per_minute,
            ratio_limit: self.ratio,
            notify: NotifySettings {
                bot_token: self.tg_token,
                chat_id: self.tg_cid,
                language: self.notify_language,
                timeout_secs: self.notify_timeout_secs,
            },
        }
    }
}

fn parse_language(value: &str) -> Result<NotifyLanguage, String> {
    value
        .parse()
        .map_err(|_| format!("unsupported notify language `{value}` (expected zh or en)"))
}

fn parse_log_format(value: &str) -> Result<LogFormat, String> {
    value
        .parse()
        .map_err(|_| format!("unsupported log format `{value}` (expected json or pretty)"))
}
