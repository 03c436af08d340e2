//! Ratio pause policy.

use crate::model::TorrentSnapshot;

/// Tag substrings that exempt a torrent from ratio-based pausing.
///
/// Matched case-insensitively against the raw tag text.
pub const PAUSE_EXEMPT_TAGS: [&str; 4] = ["TJUPT", "M-Team", "HDFans", "PT"];

/// Whether the tag text contains any exempt substring.
#[must_use]
pub fn is_exempt(tags: &str) -> bool {
    let tags = tags.to_lowercase();
    PAUSE_EXEMPT_TAGS
        .iter()
        .any(|exempt| tags.contains(&exempt.to_lowercase()))
}

/// Whether the torrent should be paused under the given ratio limit.
///
/// The ratio must strictly exceed the limit; a torrent sitting exactly on the
/// limit keeps seeding.
#[must_use]
pub fn should_pause(torrent: &TorrentSnapshot, ratio_limit: f64) -> bool {
    torrent.ratio > ratio_limit && !is_exempt(&torrent.tags)
}
