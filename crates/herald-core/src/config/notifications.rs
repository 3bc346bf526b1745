//! Read-path and bulk-operation limits.

use serde::{Deserialize, Serialize};

use crate::types::pagination::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

/// Limits applied by the notification service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsConfig {
    /// Largest page a client may request.
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u64,
    /// Page size used when the requested one is out of range.
    #[serde(default = "default_page_size")]
    pub default_page_size: u64,
    /// How many unread notifications `mark_all_read` fetches per batch.
    #[serde(default = "default_mark_all_batch")]
    pub mark_all_batch_limit: u64,
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            max_page_size: default_max_page_size(),
            default_page_size: default_page_size(),
            mark_all_batch_limit: default_mark_all_batch(),
        }
    }
}

fn default_max_page_size() -> u64 {
    MAX_PAGE_SIZE
}

fn default_page_size() -> u64 {
    DEFAULT_PAGE_SIZE
}

fn default_mark_all_batch() -> u64 {
    1000
}
