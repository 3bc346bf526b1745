//! PostgreSQL recipient ledger repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use herald_core::error::{AppError, ErrorKind};
use herald_core::result::AppResult;
use herald_core::types::id::{NotificationId, UserId};
use herald_entity::{LedgerEntry, LedgerTransition};

use crate::store::{LedgerStats, RecipientLedger};

/// PostgreSQL-backed [`RecipientLedger`].
///
/// Every state change is a single `INSERT ... ON CONFLICT DO UPDATE` keyed
/// by `(notification_id, user_id)`, so concurrent calls from several
/// clients of the same user need no extra locking.
#[derive(Debug, Clone)]
pub struct PgRecipientLedger {
    pool: PgPool,
}

impl PgRecipientLedger {
    /// Create a new ledger repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn ensure_notification(&self, notification_id: NotificationId) -> AppResult<()> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM notifications WHERE id = $1)")
                .bind(notification_id)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(
                        ErrorKind::StoreUnavailable,
                        "Failed to check notification",
                        e,
                    )
                })?;
        if exists {
            Ok(())
        } else {
            Err(AppError::not_found(format!(
                "Notification {notification_id} not found"
            )))
        }
    }
}

/// `RETURNING (xmax = 0)` is true for a fresh insert; no row means the
/// conflict branch's `WHERE` rejected the update.
fn transition(returned: Option<bool>) -> LedgerTransition {
    match returned {
        Some(true) => LedgerTransition::Created,
        Some(false) => LedgerTransition::Updated,
        None => LedgerTransition::Unchanged,
    }
}

#[async_trait]
impl RecipientLedger for PgRecipientLedger {
    async fn mark_read(
        &self,
        notification_id: NotificationId,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> AppResult<LedgerTransition> {
        self.ensure_notification(notification_id).await?;

        let inserted: Option<bool> = sqlx::query_scalar(
            "INSERT INTO notification_recipients \
             (notification_id, user_id, is_read, read_at, created_at, updated_at) \
             VALUES ($1, $2, TRUE, $3, $3, $3) \
             ON CONFLICT (notification_id, user_id) DO UPDATE \
             SET is_read = TRUE, read_at = EXCLUDED.read_at, updated_at = EXCLUDED.updated_at \
             WHERE notification_recipients.is_read = FALSE \
             RETURNING (xmax = 0)",
        )
        .bind(notification_id)
        .bind(user_id)
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::StoreUnavailable, "Failed to mark read", e))?;

        Ok(transition(inserted))
    }

    async fn dismiss(
        &self,
        notification_id: NotificationId,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> AppResult<LedgerTransition> {
        self.ensure_notification(notification_id).await?;

        let inserted: Option<bool> = sqlx::query_scalar(
            "INSERT INTO notification_recipients \
             (notification_id, user_id, is_read, read_at, dismissed_at, created_at, updated_at) \
             VALUES ($1, $2, TRUE, $3, $3, $3, $3) \
             ON CONFLICT (notification_id, user_id) DO UPDATE \
             SET dismissed_at = EXCLUDED.dismissed_at, updated_at = EXCLUDED.updated_at \
             WHERE notification_recipients.dismissed_at IS NULL \
             RETURNING (xmax = 0)",
        )
        .bind(notification_id)
        .bind(user_id)
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::StoreUnavailable, "Failed to dismiss notification", e)
        })?;

        Ok(transition(inserted))
    }

    async fn find(
        &self,
        notification_id: NotificationId,
        user_id: UserId,
    ) -> AppResult<Option<LedgerEntry>> {
        sqlx::query_as::<_, LedgerEntry>(
            "SELECT notification_id, user_id, is_read, read_at, dismissed_at, created_at, updated_at \
             FROM notification_recipients WHERE notification_id = $1 AND user_id = $2",
        )
        .bind(notification_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::StoreUnavailable, "Failed to find ledger entry", e)
        })
    }

    async fn stats(&self) -> AppResult<LedgerStats> {
        let (rows, read, dismissed): (i64, i64, i64) = sqlx::query_as(
            "SELECT COUNT(*), \
                    COUNT(*) FILTER (WHERE is_read), \
                    COUNT(*) FILTER (WHERE dismissed_at IS NOT NULL) \
             FROM notification_recipients",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::StoreUnavailable, "Failed to count ledger rows", e)
        })?;

        Ok(LedgerStats {
            rows: rows.max(0) as u64,
            read: read.max(0) as u64,
            dismissed: dismissed.max(0) as u64,
        })
    }

    async fn vacuum_orphans(&self) -> AppResult<u64> {
        let result = sqlx::query(
            "DELETE FROM notification_recipients r \
             WHERE NOT EXISTS (SELECT 1 FROM notifications n WHERE n.id = r.notification_id)",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::StoreUnavailable, "Failed to vacuum ledger", e)
        })?;
        Ok(result.rows_affected())
    }
}
