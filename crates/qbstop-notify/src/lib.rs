#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! Telegram delivery of "torrent paused" notices.
//!
//! Layout: `telegram.rs` (Bot API client with bounded retry), `message.rs`
//! (localised message text), `error.rs`.

pub mod error;
pub mod message;
pub mod telegram;

pub use error::NotifyError;
pub use message::render_message;
pub use telegram::{MAX_ATTEMPTS, TELEGRAM_API_BASE, TelegramNotifier};
