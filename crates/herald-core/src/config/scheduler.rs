//! Scheduler sweep configuration.

use serde::{Deserialize, Serialize};

/// Settings for the periodic promotion/expiry sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Whether the sweep runs in this process.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Seconds between sweep ticks.
    #[serde(default = "default_interval")]
    pub interval_seconds: u64,
    /// Whether each tick also deletes ledger rows whose notification is gone.
    #[serde(default = "default_true")]
    pub vacuum_orphans: bool,
    /// Maximum deferred notifications promoted per tick.
    #[serde(default = "default_promotion_batch")]
    pub promotion_batch_size: u64,
    /// Six-field cron expression. When set it replaces the fixed interval.
    #[serde(default)]
    pub cron: Option<String>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_seconds: default_interval(),
            vacuum_orphans: true,
            promotion_batch_size: default_promotion_batch(),
            cron: None,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_interval() -> u64 {
    300
}

fn default_promotion_batch() -> u64 {
    500
}
