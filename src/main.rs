//! Herald server: notification distribution and recipient-state engine.
//!
//! Wires the store, bus, publisher, and scheduler sweep together and runs
//! until a shutdown signal arrives.

use std::sync::Arc;

use tokio::sync::watch;
use tracing_subscriber::{EnvFilter, fmt};

use herald_core::clock::{Clock, SystemClock};
use herald_core::config::{AppConfig, LogFormat};
use herald_core::error::AppError;
use herald_database::Stores;
use herald_realtime::{BusClient, DistributionPublisher};
use herald_worker::{SchedulerSweep, SweepRunner, SweepScheduler};

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration from file and environment.
///
/// `HERALD_CONFIG` names a single file; otherwise `config/default.toml` is
/// overlaid with `config/{HERALD_ENV}.toml`.
fn load_configuration() -> Result<AppConfig, AppError> {
    if let Ok(path) = std::env::var("HERALD_CONFIG") {
        return AppConfig::load_from(&path);
    }
    let env = std::env::var("HERALD_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load(&env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format {
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        LogFormat::Pretty => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting Herald v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Notification store + recipient ledger ────────────
    tracing::info!(provider = ?config.store.provider, "Initializing stores...");
    let stores = Stores::from_config(&config.store, &config.database).await?;

    // ── Step 2: Message bus + publisher ──────────────────────────
    let bus = BusClient::from_config(&config.bus).await?;
    tracing::info!(
        backend = bus.backend_name(),
        prefix = bus.subject_prefix(),
        "Message bus ready"
    );
    let publisher = DistributionPublisher::new(bus);
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    // ── Step 3: Scheduler sweep ──────────────────────────────────
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let sweep = Arc::new(SchedulerSweep::new(
        stores,
        publisher,
        clock,
        config.scheduler.clone(),
    ));

    let mut cron_scheduler = None;
    let mut runner_handle = None;

    if !config.scheduler.enabled {
        tracing::warn!("Scheduler sweep disabled; deferred notifications will not be promoted");
    } else if let Some(expression) = config.scheduler.cron.as_deref() {
        let scheduler = SweepScheduler::new(sweep.clone()).await?;
        scheduler.register(expression).await?;
        scheduler.start().await?;
        cron_scheduler = Some(scheduler);
    } else {
        let runner = SweepRunner::new(sweep.clone());
        let cancel = shutdown_rx.clone();
        runner_handle = Some(tokio::spawn(async move {
            runner.run(cancel).await;
        }));
    }

    tracing::info!("Herald is running");

    // ── Step 4: Graceful shutdown ────────────────────────────────
    shutdown_signal().await;
    tracing::info!("Shutdown signal received, starting graceful shutdown...");
    let _ = shutdown_tx.send(true);

    if let Some(handle) = runner_handle {
        if let Err(e) = handle.await {
            tracing::error!("Sweep runner task failed: {}", e);
        }
    }
    if let Some(mut scheduler) = cron_scheduler {
        scheduler.shutdown().await?;
    }

    tracing::info!("Herald shut down");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
