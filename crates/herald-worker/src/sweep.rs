//! One sweep tick: promote, purge, vacuum.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use herald_core::clock::Clock;
use herald_core::config::SchedulerConfig;
use herald_database::Stores;
use herald_realtime::DistributionPublisher;

/// What one tick did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepReport {
    /// Deferred notifications published and cleared.
    pub promoted: u64,
    /// Deferred notifications whose publish or clear failed; retried next tick.
    pub promotion_failures: u64,
    /// Expired notifications deleted.
    pub purged: u64,
    /// Orphaned ledger rows deleted.
    pub vacuumed: u64,
}

/// Periodic maintenance over the notification store.
///
/// Every step is idempotent, so running the sweep on several instances at
/// once is safe. The worst case is a duplicate live push, which clients
/// de-duplicate by notification id.
#[derive(Debug, Clone)]
pub struct SchedulerSweep {
    /// Notification store and recipient ledger.
    stores: Stores,
    /// Publisher used for promotion.
    publisher: DistributionPublisher,
    /// Time source.
    clock: Arc<dyn Clock>,
    /// Sweep settings.
    config: SchedulerConfig,
}

impl SchedulerSweep {
    /// Create a new sweep.
    pub fn new(
        stores: Stores,
        publisher: DistributionPublisher,
        clock: Arc<dyn Clock>,
        config: SchedulerConfig,
    ) -> Self {
        Self {
            stores,
            publisher,
            clock,
            config,
        }
    }

    /// Sweep settings.
    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Run every duty once. Failures are logged and never abort the tick.
    pub async fn run_once(&self) -> SweepReport {
        let now = self.clock.now();
        let mut report = SweepReport::default();

        let (promoted, failures) = self.promote_due(now).await;
        report.promoted = promoted;
        report.promotion_failures = failures;

        match self.stores.notifications.purge_expired(now).await {
            Ok(purged) => report.purged = purged,
            Err(e) => error!(error = %e, "Expiry purge failed; retrying next tick"),
        }

        if self.config.vacuum_orphans {
            match self.stores.ledger.vacuum_orphans().await {
                Ok(vacuumed) => report.vacuumed = vacuumed,
                Err(e) => error!(error = %e, "Ledger vacuum failed; retrying next tick"),
            }
        }

        info!(
            promoted = report.promoted,
            promotion_failures = report.promotion_failures,
            purged = report.purged,
            vacuumed = report.vacuumed,
            "Notification sweep completed"
        );
        report
    }

    /// Publish every due deferred notification, clearing its schedule only
    /// after the publish succeeded. Returns `(promoted, failures)`.
    pub async fn promote_due(&self, now: DateTime<Utc>) -> (u64, u64) {
        let due = match self
            .stores
            .notifications
            .find_due(now, self.config.promotion_batch_size.max(1))
            .await
        {
            Ok(due) => due,
            Err(e) => {
                error!(error = %e, "Failed to load due notifications; retrying next tick");
                return (0, 0);
            }
        };

        let mut promoted = 0u64;
        let mut failures = 0u64;
        for notification in due {
            // Publish failures are logged by the publisher.
            if self.publisher.publish(&notification).await.is_err() {
                failures += 1;
                continue;
            }
            match self.stores.notifications.clear_schedule(notification.id).await {
                Ok(_) => {
                    debug!(notification_id = %notification.id, "Promoted deferred notification");
                    promoted += 1;
                }
                Err(e) => {
                    warn!(
                        notification_id = %notification.id,
                        error = %e,
                        "Published but failed to clear schedule; will republish next tick"
                    );
                    failures += 1;
                }
            }
        }
        (promoted, failures)
    }
}
