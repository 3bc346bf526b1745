//! Notification creation, reads, and recipient state transitions.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use herald_core::clock::Clock;
use herald_core::config::NotificationsConfig;
use herald_core::error::AppError;
use herald_core::result::AppResult;
use herald_core::types::id::NotificationId;
use herald_core::types::pagination::PageResponse;
use herald_database::Stores;
use herald_entity::{
    LedgerTransition, Notification, NotificationAction, NotificationCategory, NotificationView,
    ReadFilter,
};
use herald_realtime::DistributionPublisher;

use super::request::CreateNotificationRequest;
use super::resolver::ScopeResolver;
use crate::context::RequestContext;

/// Engine-wide counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationStats {
    /// Stored notifications.
    pub total: u64,
    /// Notifications still waiting on their schedule.
    pub pending: u64,
    /// Ledger rows.
    pub ledger_rows: u64,
    /// Ledger rows marked read.
    pub read: u64,
    /// Ledger rows dismissed.
    pub dismissed: u64,
    /// Notifications per category.
    pub by_category: BTreeMap<String, u64>,
}

/// Creates notifications and serves the client read API.
#[derive(Debug, Clone)]
pub struct NotificationService {
    /// Notification store and recipient ledger.
    stores: Stores,
    /// Read-path resolver.
    resolver: ScopeResolver,
    /// Live-push publisher.
    publisher: DistributionPublisher,
    /// Time source for every visibility decision.
    clock: Arc<dyn Clock>,
    /// Limits.
    config: NotificationsConfig,
}

impl NotificationService {
    /// Creates a new notification service.
    pub fn new(
        stores: Stores,
        publisher: DistributionPublisher,
        clock: Arc<dyn Clock>,
        config: NotificationsConfig,
    ) -> Self {
        let resolver = ScopeResolver::new(stores.notifications.clone(), config.clone());
        Self {
            stores,
            resolver,
            publisher,
            clock,
            config,
        }
    }

    /// The scope resolver backing the read path.
    pub fn resolver(&self) -> &ScopeResolver {
        &self.resolver
    }

    /// Validate, persist, and (when due) publish a notification.
    ///
    /// Returns once the row is stored. The publish runs on its own task and
    /// its outcome never reaches the caller.
    pub async fn create(&self, req: CreateNotificationRequest) -> AppResult<Notification> {
        let (notification, publish_now) = self.persist(req).await?;
        if publish_now {
            self.publisher.spawn_publish(notification.clone());
        }
        Ok(notification)
    }

    /// Like [`create`](Self::create) but waits for the publish attempt.
    ///
    /// Returns the subject the notification went out on, or `None` when it
    /// was deferred, already expired, or the bus rejected it. Storage still
    /// succeeds in every one of those cases. Used by short-lived callers such
    /// as the CLI, whose runtime would otherwise drop the publish task.
    pub async fn create_and_publish(
        &self,
        req: CreateNotificationRequest,
    ) -> AppResult<(Notification, Option<String>)> {
        let (notification, publish_now) = self.persist(req).await?;
        if !publish_now {
            return Ok((notification, None));
        }
        let subject = self.publisher.publish(&notification).await.ok();
        Ok((notification, subject))
    }

    /// Stores a validated notification and decides whether it goes out now.
    async fn persist(&self, req: CreateNotificationRequest) -> AppResult<(Notification, bool)> {
        let mut new = req.into_new_notification()?;
        let now = self.clock.now();

        // A schedule that has already elapsed means "now".
        if new.scheduled_for.is_some_and(|at| at <= now) {
            new.scheduled_for = None;
        }

        let notification = self.stores.notifications.insert(new, now).await?;

        info!(
            notification_id = %notification.id,
            category = %notification.category,
            scope = ?notification.scope(),
            "Created notification"
        );

        let publish_now = if notification.is_deferred(now) {
            debug!(
                notification_id = %notification.id,
                scheduled_for = ?notification.scheduled_for,
                "Notification deferred until its schedule"
            );
            false
        } else if notification.is_expired(now) {
            debug!(notification_id = %notification.id, "Notification already expired; not published");
            false
        } else {
            true
        };

        Ok((notification, publish_now))
    }

    /// Fire-and-forget creation for producers that never wait on it.
    pub fn submit(&self, req: CreateNotificationRequest) -> JoinHandle<()> {
        let service = self.clone();
        tokio::spawn(async move {
            let title = req.title.clone();
            if let Err(e) = service.create(req).await {
                error!(title = %title, error = %e, "Failed to create notification");
            }
        })
    }

    /// Gets a notification by id.
    pub async fn get(&self, id: NotificationId) -> AppResult<Notification> {
        self.stores
            .notifications
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Notification {id} not found")))
    }

    /// Lists the caller's visible notifications.
    pub async fn list(
        &self,
        ctx: &RequestContext,
        page: u64,
        limit: u64,
        filter: ReadFilter,
    ) -> AppResult<PageResponse<NotificationView>> {
        self.resolver
            .list(&ctx.recipient(), page, limit, filter, self.clock.now())
            .await
    }

    /// Counts the caller's visible, unread notifications.
    pub async fn unread_count(&self, ctx: &RequestContext) -> AppResult<u64> {
        self.resolver
            .unread_count(&ctx.recipient(), self.clock.now())
            .await
    }

    /// Marks a notification as read for the caller.
    pub async fn mark_read(
        &self,
        ctx: &RequestContext,
        notification_id: NotificationId,
    ) -> AppResult<LedgerTransition> {
        let transition = self
            .stores
            .ledger
            .mark_read(notification_id, ctx.user_id, self.clock.now())
            .await?;
        debug!(
            notification_id = %notification_id,
            user_id = %ctx.user_id,
            ?transition,
            "Marked notification read"
        );
        Ok(transition)
    }

    /// Dismisses a notification for the caller. There is no undo.
    pub async fn dismiss(
        &self,
        ctx: &RequestContext,
        notification_id: NotificationId,
    ) -> AppResult<LedgerTransition> {
        let transition = self
            .stores
            .ledger
            .dismiss(notification_id, ctx.user_id, self.clock.now())
            .await?;
        debug!(
            notification_id = %notification_id,
            user_id = %ctx.user_id,
            ?transition,
            "Dismissed notification"
        );
        Ok(transition)
    }

    /// Marks every visible, unread notification read for the caller.
    ///
    /// Rows are upserted one by one; a failing row is logged and skipped.
    /// Returns how many rows changed.
    pub async fn mark_all_read(&self, ctx: &RequestContext) -> AppResult<u64> {
        let recipient = ctx.recipient();
        let now = self.clock.now();
        let batch_limit = self.config.mark_all_batch_limit.max(1);
        let mut failed: HashSet<NotificationId> = HashSet::new();
        let mut marked = 0u64;

        // Rows that failed stay unread and sort ahead of the unprocessed
        // ones, so each batch widens by the failure count to reach past them.
        loop {
            let wanted = batch_limit + failed.len() as u64;
            let batch = self.resolver.unread_batch(&recipient, wanted, now).await?;
            let exhausted = (batch.len() as u64) < wanted;
            let mut attempted = false;

            for view in batch {
                let id = view.notification.id;
                if failed.contains(&id) {
                    continue;
                }
                attempted = true;
                match self.stores.ledger.mark_read(id, recipient.user_id, now).await {
                    Ok(transition) => {
                        if transition.changed() {
                            marked += 1;
                        }
                    }
                    Err(e) => {
                        warn!(
                            notification_id = %id,
                            user_id = %recipient.user_id,
                            error = %e,
                            "Failed to mark notification read; skipping"
                        );
                        failed.insert(id);
                    }
                }
            }

            if exhausted || !attempted {
                break;
            }
        }

        info!(
            user_id = %recipient.user_id,
            marked,
            skipped = failed.len(),
            "Marked all notifications read"
        );
        Ok(marked)
    }

    /// Sends the caller a test notification.
    pub async fn send_test(&self, ctx: &RequestContext) -> AppResult<Notification> {
        info!(user_id = %ctx.user_id, "Creating test notification");
        self.create(
            CreateNotificationRequest::new(
                "Test Notification",
                "This is a test notification to verify the system is working correctly.",
                NotificationCategory::Info,
            )
            .for_user(ctx.user_id)
            .created_by(ctx.user_id)
            .action(NotificationAction::new("View Dashboard", "navigate").url("/dashboard")),
        )
        .await
    }

    /// Engine-wide counters.
    pub async fn stats(&self) -> AppResult<NotificationStats> {
        let store = self.stores.notifications.stats(self.clock.now()).await?;
        let ledger = self.stores.ledger.stats().await?;
        Ok(NotificationStats {
            total: store.total,
            pending: store.pending,
            ledger_rows: ledger.rows,
            read: ledger.read,
            dismissed: ledger.dismissed,
            by_category: store.by_category,
        })
    }
}
