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

//! Ratio stopper daemon: polls qBittorrent and pauses torrents past a share ratio.
//!
//! Layout: `bootstrap.rs` (process wiring and shutdown), `cli.rs` (flags),
//! `supervisor.rs` (poll loop and session renewal), `error.rs`.

pub mod bootstrap;
pub mod cli;
pub mod error;
pub mod supervisor;

pub use bootstrap::{run_app, run_with};
pub use cli::Cli;
pub use error::{AppError, AppResult};
pub use supervisor::{CycleOutcome, CycleReport, Supervisor};
