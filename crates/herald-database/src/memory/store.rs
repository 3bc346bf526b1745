//! In-process store backed by `tokio::sync::RwLock`.
//!
//! Used for tests and single-process deployments. Visibility is evaluated
//! with the same entity predicates the SQL mirrors, and the ledger stays
//! sparse: listing never writes a row.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use herald_core::error::AppError;
use herald_core::result::AppResult;
use herald_core::types::id::{NotificationId, UserId};
use herald_core::types::pagination::{PageRequest, PageResponse};
use herald_entity::{
    LedgerEntry, LedgerTransition, NewNotification, Notification, NotificationView, ReadFilter,
    Recipient,
};

use crate::store::{LedgerStats, NotificationStore, RecipientLedger, StoreStats};

#[derive(Debug, Default)]
struct State {
    notifications: HashMap<NotificationId, Notification>,
    ledger: HashMap<(NotificationId, UserId), LedgerEntry>,
}

impl State {
    /// Visible notifications for `recipient`, annotated and sorted.
    fn visible(&self, recipient: &Recipient, now: DateTime<Utc>) -> Vec<NotificationView> {
        let mut views: Vec<NotificationView> = self
            .notifications
            .values()
            .filter_map(|n| {
                let entry = self.ledger.get(&(n.id, recipient.user_id));
                n.is_visible_to(recipient, entry, now)
                    .then(|| NotificationView::annotate(n.clone(), entry))
            })
            .collect();
        views.sort_by(|a, b| {
            b.notification
                .created_at
                .cmp(&a.notification.created_at)
                .then_with(|| a.notification.id.cmp(&b.notification.id))
        });
        views
    }

    fn require(&self, id: NotificationId) -> AppResult<()> {
        if self.notifications.contains_key(&id) {
            Ok(())
        } else {
            Err(AppError::not_found(format!("Notification {id} not found")))
        }
    }
}

/// In-process [`NotificationStore`] and [`RecipientLedger`].
///
/// Clones share the same state.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<State>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of ledger rows currently held.
    pub async fn ledger_len(&self) -> usize {
        self.state.read().await.ledger.len()
    }

    /// Number of notifications currently held.
    pub async fn notification_len(&self) -> usize {
        self.state.read().await.notifications.len()
    }
}

#[async_trait]
impl NotificationStore for MemoryStore {
    async fn insert(&self, new: NewNotification, now: DateTime<Utc>) -> AppResult<Notification> {
        let notification = new.into_notification(NotificationId::new(), now);
        self.state
            .write()
            .await
            .notifications
            .insert(notification.id, notification.clone());
        Ok(notification)
    }

    async fn find_by_id(&self, id: NotificationId) -> AppResult<Option<Notification>> {
        Ok(self.state.read().await.notifications.get(&id).cloned())
    }

    async fn exists(&self, id: NotificationId) -> AppResult<bool> {
        Ok(self.state.read().await.notifications.contains_key(&id))
    }

    async fn find_due(&self, now: DateTime<Utc>, limit: u64) -> AppResult<Vec<Notification>> {
        let state = self.state.read().await;
        let mut due: Vec<Notification> = state
            .notifications
            .values()
            .filter(|n| n.awaits_promotion(now))
            .cloned()
            .collect();
        due.sort_by(|a, b| {
            a.scheduled_for
                .cmp(&b.scheduled_for)
                .then_with(|| a.id.cmp(&b.id))
        });
        due.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(due)
    }

    async fn clear_schedule(&self, id: NotificationId) -> AppResult<bool> {
        let mut state = self.state.write().await;
        Ok(state
            .notifications
            .get_mut(&id)
            .and_then(|n| n.scheduled_for.take())
            .is_some())
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let mut state = self.state.write().await;
        let before = state.notifications.len();
        state.notifications.retain(|_, n| !n.is_expired(now));
        Ok((before - state.notifications.len()) as u64)
    }

    async fn list_visible(
        &self,
        recipient: &Recipient,
        filter: ReadFilter,
        now: DateTime<Utc>,
        page: &PageRequest,
    ) -> AppResult<PageResponse<NotificationView>> {
        let state = self.state.read().await;
        let matching: Vec<NotificationView> = state
            .visible(recipient, now)
            .into_iter()
            .filter(|view| filter.matches(view.is_read))
            .collect();
        let total = matching.len() as u64;
        let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
        let limit = usize::try_from(page.limit).unwrap_or(usize::MAX);
        let items = matching.into_iter().skip(offset).take(limit).collect();
        Ok(PageResponse::new(items, page, total))
    }

    async fn count_unread(&self, recipient: &Recipient, now: DateTime<Utc>) -> AppResult<u64> {
        let state = self.state.read().await;
        Ok(state
            .visible(recipient, now)
            .iter()
            .filter(|view| !view.is_read)
            .count() as u64)
    }

    async fn stats(&self, now: DateTime<Utc>) -> AppResult<StoreStats> {
        let state = self.state.read().await;
        let mut by_category = BTreeMap::new();
        for n in state.notifications.values() {
            *by_category.entry(n.category.as_str().to_string()).or_insert(0) += 1;
        }
        Ok(StoreStats {
            total: state.notifications.len() as u64,
            pending: state
                .notifications
                .values()
                .filter(|n| n.is_deferred(now))
                .count() as u64,
            by_category,
        })
    }
}

#[async_trait]
impl RecipientLedger for MemoryStore {
    async fn mark_read(
        &self,
        notification_id: NotificationId,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> AppResult<LedgerTransition> {
        let mut state = self.state.write().await;
        state.require(notification_id)?;
        match state.ledger.get_mut(&(notification_id, user_id)) {
            Some(entry) => Ok(entry.mark_read(now)),
            None => {
                state.ledger.insert(
                    (notification_id, user_id),
                    LedgerEntry::read(notification_id, user_id, now),
                );
                Ok(LedgerTransition::Created)
            }
        }
    }

    async fn dismiss(
        &self,
        notification_id: NotificationId,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> AppResult<LedgerTransition> {
        let mut state = self.state.write().await;
        state.require(notification_id)?;
        match state.ledger.get_mut(&(notification_id, user_id)) {
            Some(entry) => Ok(entry.dismiss(now)),
            None => {
                state.ledger.insert(
                    (notification_id, user_id),
                    LedgerEntry::dismissed(notification_id, user_id, now),
                );
                Ok(LedgerTransition::Created)
            }
        }
    }

    async fn find(
        &self,
        notification_id: NotificationId,
        user_id: UserId,
    ) -> AppResult<Option<LedgerEntry>> {
        Ok(self
            .state
            .read()
            .await
            .ledger
            .get(&(notification_id, user_id))
            .cloned())
    }

    async fn stats(&self) -> AppResult<LedgerStats> {
        let state = self.state.read().await;
        Ok(LedgerStats {
            rows: state.ledger.len() as u64,
            read: state.ledger.values().filter(|e| e.is_read).count() as u64,
            dismissed: state.ledger.values().filter(|e| e.is_dismissed()).count() as u64,
        })
    }

    async fn vacuum_orphans(&self) -> AppResult<u64> {
        let mut state = self.state.write().await;
        let State {
            notifications,
            ledger,
        } = &mut *state;
        let before = ledger.len();
        ledger.retain(|(notification_id, _), _| notifications.contains_key(notification_id));
        Ok((before - ledger.len()) as u64)
    }
}
