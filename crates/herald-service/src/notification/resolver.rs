//! Scope resolution: what a recipient can currently see.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use herald_core::config::NotificationsConfig;
use herald_core::result::AppResult;
use herald_core::types::pagination::{PageRequest, PageResponse};
use herald_database::store::NotificationStore;
use herald_entity::{NotificationView, ReadFilter, Recipient};

/// Resolves visible notifications for one recipient.
///
/// The heavy lifting is a single store query joining notifications against
/// the recipient's own ledger rows. This type owns the paging rules.
#[derive(Debug, Clone)]
pub struct ScopeResolver {
    /// Notification store.
    store: Arc<dyn NotificationStore>,
    /// Page size limits.
    config: NotificationsConfig,
}

impl ScopeResolver {
    /// Creates a new resolver.
    pub fn new(store: Arc<dyn NotificationStore>, config: NotificationsConfig) -> Self {
        Self { store, config }
    }

    /// Normalize a client page request against the configured limits.
    pub fn page_request(&self, page: u64, limit: u64) -> PageRequest {
        PageRequest::bounded(
            page,
            limit,
            self.config.default_page_size,
            self.config.max_page_size,
        )
    }

    /// One page of visible notifications, annotated and filtered.
    pub async fn list(
        &self,
        recipient: &Recipient,
        page: u64,
        limit: u64,
        filter: ReadFilter,
        now: DateTime<Utc>,
    ) -> AppResult<PageResponse<NotificationView>> {
        let page = self.page_request(page, limit);
        self.store.list_visible(recipient, filter, now, &page).await
    }

    /// Up to `limit` visible notifications the recipient has not read.
    pub async fn unread_batch(
        &self,
        recipient: &Recipient,
        limit: u64,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<NotificationView>> {
        let page = PageRequest {
            page: 1,
            limit: limit.max(1),
        };
        Ok(self
            .store
            .list_visible(recipient, ReadFilter::Unread, now, &page)
            .await?
            .items)
    }

    /// Visible, unread notifications for the recipient.
    pub async fn unread_count(&self, recipient: &Recipient, now: DateTime<Utc>) -> AppResult<u64> {
        self.store.count_unread(recipient, now).await
    }
}

#[cfg(test)]
mod tests {
    use herald_database::MemoryStore;

    use super::*;

    #[test]
    fn test_page_request_uses_configured_bounds() {
        let resolver = ScopeResolver::new(
            Arc::new(MemoryStore::new()),
            NotificationsConfig {
                max_page_size: 50,
                default_page_size: 20,
                mark_all_batch_limit: 1000,
            },
        );
        assert_eq!(resolver.page_request(0, 0), PageRequest { page: 1, limit: 20 });
        assert_eq!(resolver.page_request(2, 51), PageRequest { page: 2, limit: 20 });
        assert_eq!(resolver.page_request(3, 50), PageRequest { page: 3, limit: 50 });
    }
}
