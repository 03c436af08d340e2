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

//! Client-agnostic torrent interfaces, snapshots and the pause policy.
//!
//! Layout: `model/` (torrent snapshot DTOs), `policy.rs` (which torrents get
//! paused), `service/` (manager and notifier traits), `error.rs`.

pub mod error;
pub mod model;
pub mod policy;
pub mod service;

pub use error::{ManagerError, ManagerResult};
pub use model::TorrentSnapshot;
pub use policy::{PAUSE_EXEMPT_TAGS, is_exempt, should_pause};
pub use service::{PauseNotifier, TorrentManager};
