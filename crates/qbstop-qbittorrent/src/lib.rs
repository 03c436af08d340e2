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

//! qBittorrent Web API (`/api/v2`) client.
//!
//! Layout: `client.rs` (`QbitClient` and its `TorrentManager` impl),
//! `session.rs` (cookie session captured at login), `error.rs`.

pub mod client;
pub mod error;
pub mod session;

pub use client::QbitClient;
pub use error::BuildError;
pub use session::Session;
