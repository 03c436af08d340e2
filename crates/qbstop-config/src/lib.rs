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

//! Runtime configuration for the ratio stopper.
//!
//! Layout: `model.rs` (raw settings and the validated config), `validate.rs`
//! (field validation helpers), `defaults.rs` (default values shared with the CLI).

pub mod defaults;
pub mod error;
pub mod model;
pub mod validate;

pub use error::{ConfigError, ConfigResult};
pub use model::{
    Credentials, ManagerEndpoint, NotifyConfig, NotifyLanguage, NotifySettings, StopperConfig,
    StopperSettings,
};
