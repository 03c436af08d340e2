//! Process wiring: CLI, logging, signal handling, and the supervisor.

use std::sync::Arc;

use clap::Parser;
use qbstop_config::StopperSettings;
use qbstop_notify::TelegramNotifier;
use qbstop_qbittorrent::QbitClient;
use qbstop_telemetry::{LoggingConfig, build_sha, init_logging};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, error, info, info_span};

use crate::cli::Cli;
use crate::error::{AppError, AppResult};
use crate::supervisor::Supervisor;

/// Entry point used by the binary.
///
/// Parses the command line, installs logging, arms the shutdown watcher and
/// runs the supervisor until a signal arrives or a fatal error occurs.
///
/// # Errors
///
/// Returns an error if logging cannot be installed, the settings are invalid,
/// or the supervisor stops on a fatal manager failure.
pub async fn run_app() -> AppResult<()> {
    let cli = Cli::parse();
    let logging = LoggingConfig {
        format: cli.log_format(),
        ..LoggingConfig::default()
    };
    init_logging(&logging).map_err(|err| AppError::telemetry("telemetry.init", err))?;

    let cancel = CancellationToken::new();
    spawn_shutdown_watcher(cancel.clone());

    let result = run_with(cli.into_settings(), &cancel)
        .instrument(info_span!("supervisor"))
        .await;
    if let Err(err) = &result {
        error!(error = %err, detail = ?err, "qbstop stopped on a fatal error");
    }
    result
}

/// Validate `settings`, build the clients and supervise until `cancel` fires.
///
/// # Errors
///
/// Returns an error if validation fails, a client cannot be built, or the
/// supervisor stops on a fatal manager failure.
pub async fn run_with(settings: StopperSettings, cancel: &CancellationToken) -> AppResult<()> {
    let config = settings
        .validate()
        .map_err(|err| AppError::config("settings.validate", err))?;

    info!(
        build_sha = build_sha(),
        manager = %config.manager.base_url(),
        poll_interval_secs = config.poll_interval.as_secs_f64(),
        ratio_limit = config.ratio_limit,
        notify = config.notify.is_some(),
        "qbstop starting"
    );

    let client = QbitClient::new(&config.manager, config.credentials)
        .map_err(|err| AppError::manager_client("qbittorrent.new", err))?;
    let mut supervisor = Supervisor::new(client, config.ratio_limit, config.poll_interval);
    if let Some(notify) = config.notify.as_ref() {
        let notifier = TelegramNotifier::new(notify)
            .map_err(|err| AppError::notifier("telegram.new", err))?;
        supervisor = supervisor.with_notifier(Arc::new(notifier));
    }

    supervisor.run(cancel).await
}

fn spawn_shutdown_watcher(cancel: CancellationToken) {
    tokio::spawn(async move {
        let reason = shutdown_signal().await;
        info!(signal = reason, "shutdown requested");
        cancel.cancel();
    });
}

async fn shutdown_signal() -> &'static str {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            error!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => "ctrl-c",
        () = terminate => "terminate",
    }
}
