//! Interval runner: ticks the sweep until the cancel signal is received.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{self, MissedTickBehavior};
use tracing::info;

use crate::sweep::SchedulerSweep;

/// Runs [`SchedulerSweep::run_once`] on a fixed interval.
#[derive(Debug, Clone)]
pub struct SweepRunner {
    /// The sweep to run.
    sweep: Arc<SchedulerSweep>,
    /// Time between ticks.
    interval: Duration,
}

impl SweepRunner {
    /// Create a runner using the sweep's configured interval.
    pub fn new(sweep: Arc<SchedulerSweep>) -> Self {
        let interval = Duration::from_secs(sweep.config().interval_seconds.max(1));
        Self { sweep, interval }
    }

    /// Override the tick interval.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Run until the cancel signal flips to `true`. The first tick runs
    /// immediately.
    pub async fn run(&self, mut cancel: watch::Receiver<bool>) {
        info!(
            interval_seconds = self.interval.as_secs(),
            "Notification sweep started"
        );

        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                changed = cancel.changed() => {
                    if changed.is_err() || *cancel.borrow() {
                        info!("Notification sweep received shutdown signal");
                        break;
                    }
                }
                _ = ticker.tick() => {
                    self.sweep.run_once().await;
                }
            }
        }

        info!("Notification sweep shut down complete");
    }
}

#[cfg(test)]
mod tests {
    use herald_core::clock::{Clock, ManualClock};
    use herald_core::config::SchedulerConfig;
    use herald_database::store::NotificationStore;
    use herald_database::{MemoryStore, Stores};
    use herald_entity::{NewNotification, NotificationCategory, NotificationScope};
    use herald_realtime::{BusClient, DistributionPublisher};

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_runner_ticks_until_cancelled() {
        let store = MemoryStore::new();
        let clock = Arc::new(ManualClock::default());
        let now = clock.now();
        store
            .insert(
                NewNotification {
                    title: "Expiring".to_string(),
                    body: "Gone soon".to_string(),
                    category: NotificationCategory::Warning,
                    icon: None,
                    color: None,
                    scope: NotificationScope::System,
                    payload: None,
                    actions: Vec::new(),
                    scheduled_for: None,
                    expires_at: Some(now),
                    created_by: None,
                },
                now,
            )
            .await
            .expect("insert");

        let sweep = Arc::new(SchedulerSweep::new(
            Stores::memory(store.clone()),
            DistributionPublisher::new(BusClient::unconfigured()),
            clock,
            SchedulerConfig::default(),
        ));
        let runner = SweepRunner::new(sweep).with_interval(Duration::from_secs(60));
        let (tx, rx) = watch::channel(false);
        let handle = tokio::spawn(async move { runner.run(rx).await });

        time::sleep(Duration::from_secs(1)).await;
        assert_eq!(store.notification_len().await, 0);

        tx.send(true).expect("send");
        handle.await.expect("runner stops");
    }
}
