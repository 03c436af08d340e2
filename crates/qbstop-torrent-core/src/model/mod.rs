//! Torrent snapshot DTOs returned by a single poll.

use serde::Deserialize;

/// Immutable view of one seeding torrent as reported by the manager.
///
/// Snapshots carry no identity across polls; every cycle works on a fresh set.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TorrentSnapshot {
    /// Info-hash used by the manager to address the torrent.
    pub hash: String,
    /// Cumulative upload/download ratio.
    pub ratio: f64,
    /// Free-text tag list (comma separated in qBittorrent).
    #[serde(default)]
    pub tags: String,
    /// Display name.
    pub name: String,
}

impl TorrentSnapshot {
    /// Convenience constructor used by adapters and tests.
    #[must_use]
    pub fn new(
        hash: impl Into<String>,
        name: impl Into<String>,
        ratio: f64,
        tags: impl Into<String>,
    ) -> Self {
        Self {
            hash: hash.into(),
            ratio,
            tags: tags.into(),
            name: name.into(),
        }
    }
}
