//! Localised notification text.

use qbstop_config::NotifyLanguage;
use qbstop_torrent_core::TorrentSnapshot;

/// Render the "torrent paused" message in the requested language.
///
/// The ratio is printed as reported, without rounding.
#[must_use]
pub fn render_message(language: NotifyLanguage, torrent: &TorrentSnapshot) -> String {
    match language {
        NotifyLanguage::Zh => format!("{} 达到分享率 {}，已经暂停", torrent.name, torrent.ratio),
        NotifyLanguage::En => format!(
            "{} reached share ratio {} and has been paused",
            torrent.name, torrent.ratio
        ),
    }
}
