//! Cron scheduler for the notification sweep.

use std::sync::Arc;

use tokio_cron_scheduler::{Job as CronJob, JobScheduler};
use tracing::info;

use herald_core::error::AppError;

use crate::sweep::SchedulerSweep;

/// Runs the sweep on a cron schedule instead of a fixed interval.
pub struct SweepScheduler {
    /// The underlying job scheduler.
    scheduler: JobScheduler,
    /// The sweep to run.
    sweep: Arc<SchedulerSweep>,
}

impl std::fmt::Debug for SweepScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SweepScheduler").finish()
    }
}

impl SweepScheduler {
    /// Create a new cron scheduler.
    pub async fn new(sweep: Arc<SchedulerSweep>) -> Result<Self, AppError> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| AppError::internal(format!("Failed to create scheduler: {e}")))?;

        Ok(Self { scheduler, sweep })
    }

    /// Register the sweep under a six-field cron expression
    /// (`sec min hour day month weekday`).
    pub async fn register(&self, expression: &str) -> Result<(), AppError> {
        let sweep = Arc::clone(&self.sweep);
        let job = CronJob::new_async(expression, move |_uuid, _lock| {
            let sweep = Arc::clone(&sweep);
            Box::pin(async move {
                sweep.run_once().await;
            })
        })
        .map_err(|e| {
            AppError::configuration(format!("Invalid sweep schedule '{expression}': {e}"))
        })?;

        self.scheduler
            .add(job)
            .await
            .map_err(|e| AppError::internal(format!("Failed to add sweep schedule: {e}")))?;

        info!(schedule = expression, "Registered: notification_sweep");
        Ok(())
    }

    /// Start the scheduler.
    pub async fn start(&self) -> Result<(), AppError> {
        self.scheduler
            .start()
            .await
            .map_err(|e| AppError::internal(format!("Failed to start scheduler: {e}")))?;

        info!("Cron scheduler started");
        Ok(())
    }

    /// Shutdown the scheduler.
    pub async fn shutdown(&mut self) -> Result<(), AppError> {
        self.scheduler
            .shutdown()
            .await
            .map_err(|e| AppError::internal(format!("Failed to shutdown scheduler: {e}")))?;

        info!("Cron scheduler shut down");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use herald_core::clock::SystemClock;
    use herald_core::config::SchedulerConfig;
    use herald_core::error::ErrorKind;
    use herald_database::{MemoryStore, Stores};
    use herald_realtime::{BusClient, DistributionPublisher};

    use super::*;

    fn sweep() -> Arc<SchedulerSweep> {
        Arc::new(SchedulerSweep::new(
            Stores::memory(MemoryStore::new()),
            DistributionPublisher::new(BusClient::unconfigured()),
            Arc::new(SystemClock),
            SchedulerConfig::default(),
        ))
    }

    #[tokio::test]
    async fn test_rejects_invalid_expression() {
        let scheduler = SweepScheduler::new(sweep()).await.expect("scheduler");
        let err = scheduler.register("every five minutes").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Configuration);
    }

    #[tokio::test]
    async fn test_registers_valid_expression() {
        let scheduler = SweepScheduler::new(sweep()).await.expect("scheduler");
        scheduler.register("0 */5 * * * *").await.expect("register");
    }
}
