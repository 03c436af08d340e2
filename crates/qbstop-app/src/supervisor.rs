//! Poll loop and session supervision.
//!
//! # Design
//! - One cycle at a time: list, filter, pause, then sleep the full interval
//!   counted from the end of the cycle (fixed delay, never overlapping).
//! - A rejected session is renewed and the rest of that cycle is dropped.
//! - Any other manager failure ends the loop; logout still runs once.
//! - Notices are spawned and never joined, so a slow notifier cannot hold up
//!   pauses or later cycles.

use std::sync::Arc;
use std::time::Duration;

use qbstop_torrent_core::{
    ManagerError, PauseNotifier, TorrentManager, TorrentSnapshot, should_pause,
};
use tokio::time::{sleep, timeout};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::error::{AppError, AppResult};

/// Upper bound on the shutdown logout call.
const LOGOUT_GRACE: Duration = Duration::from_secs(5);

/// Summary of a completed poll cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleReport {
    /// Seeding torrents returned by the manager.
    pub listed: usize,
    /// Torrents paused during the cycle.
    pub paused: usize,
}

/// How a poll cycle ended when it did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Every qualifying torrent was paused.
    Completed(CycleReport),
    /// The session was rejected and has been re-established; the cycle's
    /// remaining work was dropped.
    SessionRenewed,
}

/// Drives the poll loop against a torrent manager.
pub struct Supervisor<M> {
    manager: M,
    ratio_limit: f64,
    poll_interval: Duration,
    notifier: Option<Arc<dyn PauseNotifier>>,
}

impl<M: TorrentManager> Supervisor<M> {
    /// Create a supervisor without notifications.
    #[must_use]
    pub const fn new(manager: M, ratio_limit: f64, poll_interval: Duration) -> Self {
        Self {
            manager,
            ratio_limit,
            poll_interval,
            notifier: None,
        }
    }

    /// Send a notice through `notifier` for every paused torrent.
    #[must_use]
    pub fn with_notifier(mut self, notifier: Arc<dyn PauseNotifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Log in, poll until `cancel` fires or a fatal error occurs, then log out.
    ///
    /// A failed initial login returns immediately without polling or logging
    /// out.
    ///
    /// # Errors
    ///
    /// Returns the login failure, or the first manager failure that is not a
    /// session expiry.
    pub async fn run(mut self, cancel: &CancellationToken) -> AppResult<()> {
        let login = tokio::select! {
            biased;
            () = cancel.cancelled() => {
                info!("shutdown requested before login completed");
                return Ok(());
            }
            result = self.manager.login() => result,
        };
        if let Err(err) = login {
            log_login_failure(&err);
            return Err(AppError::manager("login", err));
        }
        info!("logged in to qBittorrent");

        let outcome = self.poll(cancel).await;

        info!("logging out of qBittorrent");
        if timeout(LOGOUT_GRACE, self.manager.logout()).await.is_err() {
            debug!("logout did not finish before the grace period");
        }
        outcome
    }

    async fn poll(&mut self, cancel: &CancellationToken) -> AppResult<()> {
        loop {
            let outcome = tokio::select! {
                biased;
                () = cancel.cancelled() => return Ok(()),
                outcome = self.run_cycle() => outcome?,
            };
            match outcome {
                CycleOutcome::Completed(report) => debug!(
                    listed = report.listed,
                    paused = report.paused,
                    "poll cycle completed"
                ),
                CycleOutcome::SessionRenewed => debug!("poll cycle abandoned after session renewal"),
            }

            tokio::select! {
                biased;
                () = cancel.cancelled() => return Ok(()),
                () = sleep(self.poll_interval) => {}
            }
        }
    }

    async fn run_cycle(&mut self) -> AppResult<CycleOutcome> {
        let torrents = match self.manager.list_seeding().await {
            Ok(torrents) => torrents,
            Err(err) if err.is_session_expired() => return self.renew_session().await,
            Err(err) => return Err(AppError::manager("list", err)),
        };

        let listed = torrents.len();
        let ratio_limit = self.ratio_limit;
        let mut paused = 0;
        for torrent in torrents
            .into_iter()
            .filter(|torrent| should_pause(torrent, ratio_limit))
        {
            match self.manager.pause(&torrent.hash).await {
                Ok(()) => {}
                Err(err) if err.is_session_expired() => return self.renew_session().await,
                Err(err) => return Err(AppError::manager("pause", err)),
            }
            paused += 1;
            info!(
                torrent = %torrent.name,
                hash = %torrent.hash,
                ratio = torrent.ratio,
                "paused torrent over ratio limit"
            );
            self.dispatch_notice(torrent);
        }

        Ok(CycleOutcome::Completed(CycleReport { listed, paused }))
    }

    async fn renew_session(&mut self) -> AppResult<CycleOutcome> {
        warn!("qBittorrent session expired; logging in again");
        if let Err(err) = self.manager.login().await {
            log_login_failure(&err);
            return Err(AppError::manager("relogin", err));
        }
        info!("logged in to qBittorrent");
        Ok(CycleOutcome::SessionRenewed)
    }

    fn dispatch_notice(&self, torrent: TorrentSnapshot) {
        let Some(notifier) = self.notifier.as_ref().map(Arc::clone) else {
            return;
        };
        tokio::spawn(async move {
            notifier.notify(&torrent).await;
        });
    }
}

fn log_login_failure(err: &ManagerError) {
    match err {
        ManagerError::InvalidCredentials { username } => {
            error!(username = %username, "qBittorrent rejected the username or password");
        }
        other => error!(error = ?other, "qBittorrent login failed"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qbstop_test_support::fixtures::{seeding, tagged};
    use qbstop_test_support::mocks::{
        Failure, ManagerCall, RecordingNotifier, ScriptedManager, StalledNotifier,
    };

    const INTERVAL: Duration = Duration::from_secs(60);

    fn cancel_on_list(cancel: &CancellationToken, list: usize) -> impl FnMut(usize) + Send + 'static {
        let cancel = cancel.clone();
        move |seen| {
            if seen >= list {
                cancel.cancel();
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn pauses_only_torrents_over_limit_and_notifies() -> anyhow::Result<()> {
        let cancel = CancellationToken::new();
        let manager = ScriptedManager::new()
            .listing(vec![
                seeding("r15", 1.5),
                seeding("r20", 2.0),
                seeding("r21", 2.1),
                seeding("r30", 3.0),
                tagged("mteam", 5.0, "M-Team, Freeleech"),
            ])
            .on_list(cancel_on_list(&cancel, 1));
        let log = manager.log();
        let (notifier, mut notices) = RecordingNotifier::channel();

        Supervisor::new(manager, 2.0, INTERVAL)
            .with_notifier(Arc::new(notifier))
            .run(&cancel)
            .await?;

        assert_eq!(log.paused(), vec!["hash-r21".to_string(), "hash-r30".to_string()]);
        assert_eq!(log.count(&ManagerCall::Login), 1);
        assert_eq!(log.count(&ManagerCall::Logout), 1);

        let mut notified = Vec::new();
        for _ in 0..2 {
            if let Some(torrent) = notices.recv().await {
                notified.push(torrent.name);
            }
        }
        notified.sort();
        assert_eq!(notified, vec!["r21".to_string(), "r30".to_string()]);
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn listing_expiry_relogins_once_and_skips_the_cycle() -> anyhow::Result<()> {
        let cancel = CancellationToken::new();
        let manager = ScriptedManager::new()
            .listing_failure(Failure::SessionExpired)
            .listing(vec![seeding("a", 3.0)])
            .on_list(cancel_on_list(&cancel, 2));
        let log = manager.log();

        Supervisor::new(manager, 2.0, INTERVAL).run(&cancel).await?;

        assert_eq!(
            log.calls(),
            vec![
                ManagerCall::Login,
                ManagerCall::List,
                ManagerCall::Login,
                ManagerCall::List,
                ManagerCall::Pause("hash-a".to_string()),
                ManagerCall::Logout,
            ]
        );
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn pause_expiry_abandons_the_rest_of_the_cycle() -> anyhow::Result<()> {
        let cancel = CancellationToken::new();
        let manager = ScriptedManager::new()
            .listing(vec![seeding("a", 3.0), seeding("b", 4.0)])
            .pause_failure("hash-a", Failure::SessionExpired)
            .on_list(cancel_on_list(&cancel, 2));
        let log = manager.log();
        let (notifier, mut notices) = RecordingNotifier::channel();

        Supervisor::new(manager, 2.0, INTERVAL)
            .with_notifier(Arc::new(notifier))
            .run(&cancel)
            .await?;

        assert_eq!(
            log.calls(),
            vec![
                ManagerCall::Login,
                ManagerCall::List,
                ManagerCall::Pause("hash-a".to_string()),
                ManagerCall::Login,
                ManagerCall::List,
                ManagerCall::Logout,
            ]
        );
        tokio::task::yield_now().await;
        assert!(notices.try_recv().is_err());
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn wrong_credentials_never_start_polling() {
        let manager = ScriptedManager::new().login_result(Err(Failure::InvalidCredentials));
        let log = manager.log();
        let (notifier, mut notices) = RecordingNotifier::channel();

        let result = Supervisor::new(manager, 2.0, INTERVAL)
            .with_notifier(Arc::new(notifier))
            .run(&CancellationToken::new())
            .await;

        assert!(matches!(
            result,
            Err(AppError::Manager {
                operation: "login",
                source: ManagerError::InvalidCredentials { .. }
            })
        ));
        assert_eq!(log.calls(), vec![ManagerCall::Login]);
        assert!(notices.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn unexpected_listing_failure_is_fatal_after_logout() {
        let manager = ScriptedManager::new().listing_failure(Failure::Status(500));
        let log = manager.log();

        let result = Supervisor::new(manager, 2.0, INTERVAL)
            .run(&CancellationToken::new())
            .await;

        assert!(matches!(
            result,
            Err(AppError::Manager {
                operation: "list",
                source: ManagerError::UnexpectedStatus { status: 500, .. }
            })
        ));
        assert_eq!(
            log.calls(),
            vec![ManagerCall::Login, ManagerCall::List, ManagerCall::Logout]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn unexpected_pause_failure_is_fatal_after_logout() {
        let manager = ScriptedManager::new()
            .listing(vec![seeding("a", 3.0), seeding("b", 3.0)])
            .pause_failure("hash-a", Failure::Status(500));
        let log = manager.log();

        let result = Supervisor::new(manager, 2.0, INTERVAL)
            .run(&CancellationToken::new())
            .await;

        assert!(matches!(
            result,
            Err(AppError::Manager {
                operation: "pause",
                ..
            })
        ));
        assert_eq!(log.paused(), vec!["hash-a".to_string()]);
        assert_eq!(log.count(&ManagerCall::Logout), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_relogin_is_fatal() {
        let manager = ScriptedManager::new()
            .login_result(Ok(()))
            .login_result(Err(Failure::InvalidCredentials))
            .listing_failure(Failure::SessionExpired);
        let log = manager.log();

        let result = Supervisor::new(manager, 2.0, INTERVAL)
            .run(&CancellationToken::new())
            .await;

        assert!(matches!(
            result,
            Err(AppError::Manager {
                operation: "relogin",
                ..
            })
        ));
        assert_eq!(
            log.calls(),
            vec![
                ManagerCall::Login,
                ManagerCall::List,
                ManagerCall::Login,
                ManagerCall::Logout,
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn cycles_use_fixed_delay_and_never_overlap() -> anyhow::Result<()> {
        let cancel = CancellationToken::new();
        let work = Duration::from_secs(90);
        let manager = ScriptedManager::new()
            .list_latency(work)
            .on_list(cancel_on_list(&cancel, 3));
        let log = manager.log();

        Supervisor::new(manager, 2.0, INTERVAL).run(&cancel).await?;

        let starts = log.instants_of(&ManagerCall::List);
        assert_eq!(starts.len(), 3);
        for pair in starts.windows(2) {
            let gap = pair[1].duration_since(pair[0]);
            assert!(gap >= work + INTERVAL, "cycles overlapped: {gap:?}");
            assert!(gap < work + INTERVAL + Duration::from_secs(1));
        }
        assert_eq!(log.count(&ManagerCall::Logout), 1);
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn slow_notices_do_not_hold_up_pauses() -> anyhow::Result<()> {
        let cancel = CancellationToken::new();
        let manager = ScriptedManager::new()
            .listing(vec![seeding("a", 3.0), seeding("b", 3.0), seeding("c", 3.0)])
            .on_list(cancel_on_list(&cancel, 1));
        let log = manager.log();
        let (notifier, mut notices) =
            RecordingNotifier::channel_with_delay(Duration::from_secs(3600));

        Supervisor::new(manager, 2.0, INTERVAL)
            .with_notifier(Arc::new(notifier))
            .run(&cancel)
            .await?;

        assert_eq!(log.paused().len(), 3);
        assert!(notices.try_recv().is_err());

        let mut delivered = 0;
        while delivered < 3 && notices.recv().await.is_some() {
            delivered += 1;
        }
        assert_eq!(delivered, 3);
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn hung_notices_do_not_delay_the_next_cycle() -> anyhow::Result<()> {
        let cancel = CancellationToken::new();
        let manager = ScriptedManager::new()
            .listing(vec![seeding("a", 3.0), seeding("b", 3.0), seeding("c", 3.0)])
            .listing(vec![seeding("d", 3.0)])
            .on_list(cancel_on_list(&cancel, 2));
        let log = manager.log();
        let notifier = StalledNotifier::new();
        let started = notifier.clone();

        Supervisor::new(manager, 2.0, INTERVAL)
            .with_notifier(Arc::new(notifier))
            .run(&cancel)
            .await?;

        let lists = log.instants_of(&ManagerCall::List);
        assert_eq!(lists.len(), 2);
        let gap = lists[1].duration_since(lists[0]);
        assert!(gap >= INTERVAL && gap < INTERVAL + Duration::from_secs(1), "gap {gap:?}");
        assert_eq!(
            log.instants_of(&ManagerCall::Pause("hash-d".to_string())),
            vec![lists[1]]
        );
        assert_eq!(
            log.paused(),
            vec![
                "hash-a".to_string(),
                "hash-b".to_string(),
                "hash-c".to_string(),
                "hash-d".to_string(),
            ]
        );
        assert_eq!(log.calls().last(), Some(&ManagerCall::Logout));
        assert!(started.started() >= 3);
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn cycle_report_counts_listed_and_paused() -> anyhow::Result<()> {
        let manager = ScriptedManager::new().listing(vec![
            seeding("a", 3.0),
            tagged("b", 3.0, "hdfans"),
            seeding("c", 1.0),
        ]);
        let mut supervisor = Supervisor::new(manager, 2.0, INTERVAL);

        let outcome = supervisor.run_cycle().await?;
        assert_eq!(
            outcome,
            CycleOutcome::Completed(CycleReport {
                listed: 3,
                paused: 1
            })
        );
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_stops_the_loop_while_sleeping() -> anyhow::Result<()> {
        let cancel = CancellationToken::new();
        let manager = ScriptedManager::new();
        let log = manager.log();
        let stopper = cancel.clone();
        tokio::spawn(async move {
            sleep(Duration::from_secs(150)).await;
            stopper.cancel();
        });

        Supervisor::new(manager, 2.0, INTERVAL).run(&cancel).await?;

        assert_eq!(log.count(&ManagerCall::List), 3);
        assert_eq!(log.calls().last(), Some(&ManagerCall::Logout));
        Ok(())
    }
}
