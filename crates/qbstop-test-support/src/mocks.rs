//! In-memory stand-ins for the torrent manager and notifier.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use qbstop_torrent_core::{
    ManagerError, ManagerResult, PauseNotifier, TorrentManager, TorrentSnapshot,
};
use tokio::sync::mpsc;
use tokio::time::{Instant, sleep};

/// Failure a scripted call should produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    /// Report [`ManagerError::SessionExpired`].
    SessionExpired,
    /// Report [`ManagerError::InvalidCredentials`].
    InvalidCredentials,
    /// Report [`ManagerError::UnexpectedStatus`] with the given code.
    Status(u16),
}

impl Failure {
    fn into_error(self, operation: &'static str) -> ManagerError {
        match self {
            Self::SessionExpired => ManagerError::SessionExpired { operation },
            Self::InvalidCredentials => ManagerError::InvalidCredentials {
                username: "admin".to_string(),
            },
            Self::Status(status) => ManagerError::UnexpectedStatus { operation, status },
        }
    }
}

/// A call observed by [`ScriptedManager`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManagerCall {
    /// `login` was invoked.
    Login,
    /// `logout` was invoked.
    Logout,
    /// `list_seeding` was invoked.
    List,
    /// `pause` was invoked for the given hash.
    Pause(String),
}

/// Shared, timestamped record of manager calls.
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    inner: Arc<Mutex<Vec<(Instant, ManagerCall)>>>,
}

impl CallLog {
    fn record(&self, call: ManagerCall) {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((Instant::now(), call));
    }

    /// Calls in the order they happened.
    #[must_use]
    pub fn calls(&self) -> Vec<ManagerCall> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, call)| call.clone())
            .collect()
    }

    /// Number of recorded calls equal to `call`.
    #[must_use]
    pub fn count(&self, call: &ManagerCall) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|(_, recorded)| recorded == call)
            .count()
    }

    /// Hashes passed to `pause`, in order.
    #[must_use]
    pub fn paused(&self) -> Vec<String> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter_map(|(_, call)| match call {
                ManagerCall::Pause(hash) => Some(hash.clone()),
                _ => None,
            })
            .collect()
    }

    /// Instants at which `call` was observed.
    #[must_use]
    pub fn instants_of(&self, call: &ManagerCall) -> Vec<Instant> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|(_, recorded)| recorded == call)
            .map(|(at, _)| *at)
            .collect()
    }
}

type ListHook = Box<dyn FnMut(usize) + Send>;

/// Torrent manager whose responses are scripted up front.
///
/// Exhausted scripts fall back to success: logins succeed and listings return
/// an empty set.
#[derive(Default)]
pub struct ScriptedManager {
    log: CallLog,
    logins: VecDeque<Result<(), Failure>>,
    listings: VecDeque<Result<Vec<TorrentSnapshot>, Failure>>,
    pause_failures: HashMap<String, Failure>,
    list_latency: Duration,
    list_hook: Option<ListHook>,
    lists_seen: usize,
}

impl ScriptedManager {
    /// Create a manager with empty scripts.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle onto the call log that stays valid after the manager is moved.
    #[must_use]
    pub fn log(&self) -> CallLog {
        self.log.clone()
    }

    /// Queue the outcome of the next `login`; unqueued logins succeed.
    #[must_use]
    pub fn login_result(mut self, result: Result<(), Failure>) -> Self {
        self.logins.push_back(result);
        self
    }

    /// Queue a successful listing.
    #[must_use]
    pub fn listing(mut self, torrents: Vec<TorrentSnapshot>) -> Self {
        self.listings.push_back(Ok(torrents));
        self
    }

    /// Queue a failed listing.
    #[must_use]
    pub fn listing_failure(mut self, failure: Failure) -> Self {
        self.listings.push_back(Err(failure));
        self
    }

    /// Fail the first `pause` of `hash` with `failure`.
    #[must_use]
    pub fn pause_failure(mut self, hash: impl Into<String>, failure: Failure) -> Self {
        self.pause_failures.insert(hash.into(), failure);
        self
    }

    /// Make every listing take `latency` of (tokio) time.
    #[must_use]
    pub fn list_latency(mut self, latency: Duration) -> Self {
        self.list_latency = latency;
        self
    }

    /// Run `hook` with the 1-based listing count at the start of every listing.
    #[must_use]
    pub fn on_list(mut self, hook: impl FnMut(usize) + Send + 'static) -> Self {
        self.list_hook = Some(Box::new(hook));
        self
    }
}

#[async_trait]
impl TorrentManager for ScriptedManager {
    async fn login(&mut self) -> ManagerResult<()> {
        self.log.record(ManagerCall::Login);
        match self.logins.pop_front() {
            Some(Err(failure)) => Err(failure.into_error("login")),
            Some(Ok(())) | None => Ok(()),
        }
    }

    async fn logout(&mut self) {
        self.log.record(ManagerCall::Logout);
    }

    async fn list_seeding(&mut self) -> ManagerResult<Vec<TorrentSnapshot>> {
        self.log.record(ManagerCall::List);
        self.lists_seen += 1;
        if let Some(hook) = self.list_hook.as_mut() {
            hook(self.lists_seen);
        }
        if !self.list_latency.is_zero() {
            sleep(self.list_latency).await;
        }
        match self.listings.pop_front() {
            Some(Ok(torrents)) => Ok(torrents),
            Some(Err(failure)) => Err(failure.into_error("list")),
            None => Ok(Vec::new()),
        }
    }

    async fn pause(&mut self, hash: &str) -> ManagerResult<()> {
        self.log.record(ManagerCall::Pause(hash.to_string()));
        match self.pause_failures.remove(hash) {
            Some(failure) => Err(failure.into_error("pause")),
            None => Ok(()),
        }
    }
}

/// Notifier that forwards every notice to a channel.
#[derive(Debug, Clone)]
pub struct RecordingNotifier {
    sender: mpsc::UnboundedSender<TorrentSnapshot>,
    delay: Duration,
}

impl RecordingNotifier {
    /// Create a notifier and the receiver that observes its notices.
    #[must_use]
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<TorrentSnapshot>) {
        Self::channel_with_delay(Duration::ZERO)
    }

    /// Create a notifier that waits `delay` before recording each notice.
    #[must_use]
    pub fn channel_with_delay(delay: Duration) -> (Self, mpsc::UnboundedReceiver<TorrentSnapshot>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender, delay }, receiver)
    }
}

#[async_trait]
impl PauseNotifier for RecordingNotifier {
    async fn notify(&self, torrent: &TorrentSnapshot) {
        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }
        let _ = self.sender.send(torrent.clone());
    }
}

/// Notifier whose deliveries never finish.
#[derive(Debug, Clone, Default)]
pub struct StalledNotifier {
    started: Arc<AtomicUsize>,
}

impl StalledNotifier {
    /// Create a notifier with no deliveries started.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of deliveries that have begun (and are still hanging).
    #[must_use]
    pub fn started(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PauseNotifier for StalledNotifier {
    async fn notify(&self, _torrent: &TorrentSnapshot) {
        self.started.fetch_add(1, Ordering::SeqCst);
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::seeding;

    #[tokio::test]
    async fn scripted_manager_replays_scripts_then_defaults() {
        let mut manager = ScriptedManager::new()
            .login_result(Err(Failure::InvalidCredentials))
            .listing(vec![seeding("a", 3.0)])
            .listing_failure(Failure::SessionExpired)
            .pause_failure("hash-a", Failure::Status(500));
        let log = manager.log();

        assert!(matches!(
            manager.login().await,
            Err(ManagerError::InvalidCredentials { .. })
        ));
        assert!(manager.login().await.is_ok());
        assert_eq!(manager.list_seeding().await.ok(), Some(vec![seeding("a", 3.0)]));
        assert!(
            manager
                .list_seeding()
                .await
                .err()
                .is_some_and(|err| err.is_session_expired())
        );
        assert_eq!(manager.list_seeding().await.ok(), Some(Vec::new()));
        assert!(manager.pause("hash-a").await.is_err());
        assert!(manager.pause("hash-a").await.is_ok());
        manager.logout().await;

        assert_eq!(log.count(&ManagerCall::Login), 2);
        assert_eq!(log.count(&ManagerCall::List), 3);
        assert_eq!(log.paused(), vec!["hash-a".to_string(), "hash-a".to_string()]);
        assert_eq!(log.calls().last(), Some(&ManagerCall::Logout));
    }

    #[tokio::test]
    async fn recording_notifier_forwards_notices() {
        let (notifier, mut receiver) = RecordingNotifier::channel();
        notifier.notify(&seeding("b", 2.5)).await;
        assert_eq!(receiver.recv().await, Some(seeding("b", 2.5)));
    }

    #[tokio::test]
    async fn stalled_notifier_never_completes() {
        let notifier = StalledNotifier::new();
        let outcome = tokio::time::timeout(
            Duration::from_millis(20),
            notifier.notify(&seeding("c", 3.0)),
        )
        .await;
        assert!(outcome.is_err());
        assert_eq!(notifier.started(), 1);
    }
}
