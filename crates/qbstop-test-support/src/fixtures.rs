//! Snapshot builders.

use qbstop_torrent_core::TorrentSnapshot;

/// Build an untagged seeding torrent whose hash and name derive from `label`.
#[must_use]
pub fn seeding(label: &str, ratio: f64) -> TorrentSnapshot {
    tagged(label, ratio, "")
}

/// Build a seeding torrent carrying the given tag text.
#[must_use]
pub fn tagged(label: &str, ratio: f64, tags: &str) -> TorrentSnapshot {
    TorrentSnapshot::new(format!("hash-{label}"), label, ratio, tags)
}
