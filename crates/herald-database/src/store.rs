//! Storage traits for notifications and the recipient ledger.
//!
//! The service and the sweep only ever talk to these traits. Two backends
//! implement them: the PostgreSQL repositories and [`MemoryStore`].

use std::collections::BTreeMap;
use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use herald_core::config::{DatabaseConfig, StoreConfig, StoreProvider};
use herald_core::result::AppResult;
use herald_core::types::id::{NotificationId, UserId};
use herald_core::types::pagination::{PageRequest, PageResponse};
use herald_entity::{
    LedgerEntry, LedgerTransition, NewNotification, Notification, NotificationView, ReadFilter,
    Recipient,
};

use crate::connection::DatabasePool;
use crate::memory::MemoryStore;
use crate::migration::run_migrations;
use crate::repositories::{PgNotificationStore, PgRecipientLedger};

/// Aggregate counts over the notification table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreStats {
    /// All stored notifications, including deferred and expired ones.
    pub total: u64,
    /// Notifications still waiting on a future `scheduled_for`.
    pub pending: u64,
    /// Notifications per category wire name.
    pub by_category: BTreeMap<String, u64>,
}

/// Aggregate counts over the recipient ledger.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerStats {
    /// Ledger rows, orphans included.
    pub rows: u64,
    /// Rows with `is_read = true`.
    pub read: u64,
    /// Rows with `dismissed_at` set.
    pub dismissed: u64,
}

/// Durable record of every notification.
#[async_trait]
pub trait NotificationStore: Send + Sync + Debug + 'static {
    /// Persist a validated notification and return the stored row.
    async fn insert(&self, new: NewNotification, now: DateTime<Utc>) -> AppResult<Notification>;

    /// Find a notification by id.
    async fn find_by_id(&self, id: NotificationId) -> AppResult<Option<Notification>>;

    /// Whether a notification with this id exists.
    async fn exists(&self, id: NotificationId) -> AppResult<bool>;

    /// Deferred notifications whose `scheduled_for` has elapsed and that
    /// have not expired, oldest schedule first.
    async fn find_due(&self, now: DateTime<Utc>, limit: u64) -> AppResult<Vec<Notification>>;

    /// Set `scheduled_for` to null. Returns whether a row was changed.
    async fn clear_schedule(&self, id: NotificationId) -> AppResult<bool>;

    /// Hard-delete every notification with `expires_at <= now`.
    async fn purge_expired(&self, now: DateTime<Utc>) -> AppResult<u64>;

    /// Visible notifications for `recipient`, annotated with its read state,
    /// filtered, then paginated. Ordered by `created_at` desc, `id` asc.
    async fn list_visible(
        &self,
        recipient: &Recipient,
        filter: ReadFilter,
        now: DateTime<Utc>,
        page: &PageRequest,
    ) -> AppResult<PageResponse<NotificationView>>;

    /// Number of visible, unread notifications for `recipient`.
    async fn count_unread(&self, recipient: &Recipient, now: DateTime<Utc>) -> AppResult<u64>;

    /// Aggregate counts.
    async fn stats(&self, now: DateTime<Utc>) -> AppResult<StoreStats>;
}

/// Sparse per-(notification, user) read and dismissal state.
#[async_trait]
pub trait RecipientLedger: Send + Sync + Debug + 'static {
    /// Idempotently record a read. Fails with `NotFound` when the
    /// notification does not exist.
    async fn mark_read(
        &self,
        notification_id: NotificationId,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> AppResult<LedgerTransition>;

    /// Idempotently record a dismissal. A new row is also marked read.
    /// Fails with `NotFound` when the notification does not exist.
    async fn dismiss(
        &self,
        notification_id: NotificationId,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> AppResult<LedgerTransition>;

    /// The user's own row for a notification.
    async fn find(
        &self,
        notification_id: NotificationId,
        user_id: UserId,
    ) -> AppResult<Option<LedgerEntry>>;

    /// Aggregate counts.
    async fn stats(&self) -> AppResult<LedgerStats>;

    /// Delete rows whose notification no longer exists.
    async fn vacuum_orphans(&self) -> AppResult<u64>;
}

/// The two storage handles the engine runs on, backed by the same store.
#[derive(Debug, Clone)]
pub struct Stores {
    /// Notification table.
    pub notifications: Arc<dyn NotificationStore>,
    /// Recipient ledger.
    pub ledger: Arc<dyn RecipientLedger>,
}

impl Stores {
    /// Build the stores selected by configuration.
    ///
    /// The PostgreSQL backend connects and runs pending migrations first.
    pub async fn from_config(store: &StoreConfig, database: &DatabaseConfig) -> AppResult<Self> {
        match store.provider {
            StoreProvider::Postgres => {
                let db = DatabasePool::connect(database).await?;
                run_migrations(db.pool()).await?;
                Ok(Self::postgres(&db))
            }
            StoreProvider::Memory => {
                info!("Using in-process notification store");
                Ok(Self::memory(MemoryStore::new()))
            }
        }
    }

    /// PostgreSQL repositories sharing one pool.
    pub fn postgres(db: &DatabasePool) -> Self {
        Self {
            notifications: Arc::new(PgNotificationStore::new(db.pool().clone())),
            ledger: Arc::new(PgRecipientLedger::new(db.pool().clone())),
        }
    }

    /// Both handles backed by one in-process store.
    pub fn memory(store: MemoryStore) -> Self {
        let store = Arc::new(store);
        Self {
            notifications: store.clone(),
            ledger: store,
        }
    }
}
