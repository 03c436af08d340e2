//! Manager and notifier traits implemented by adapters.

use async_trait::async_trait;

use crate::error::ManagerResult;
use crate::model::TorrentSnapshot;

/// Session-holding client for a torrent manager's management API.
///
/// Implementations own their session state; callers only observe it through
/// [`crate::ManagerError::SessionExpired`].
#[async_trait]
pub trait TorrentManager: Send {
    /// Establish a fresh session, replacing any held one.
    async fn login(&mut self) -> ManagerResult<()>;

    /// End the held session; failures are swallowed.
    async fn logout(&mut self);

    /// Fetch the torrents that are currently seeding.
    async fn list_seeding(&mut self) -> ManagerResult<Vec<TorrentSnapshot>>;

    /// Stop the torrent identified by `hash`.
    async fn pause(&mut self, hash: &str) -> ManagerResult<()>;
}

/// Best-effort sink for "torrent paused" notices.
#[async_trait]
pub trait PauseNotifier: Send + Sync {
    /// Deliver a notice for a paused torrent. Never fails from the caller's view.
    async fn notify(&self, torrent: &TorrentSnapshot);
}
