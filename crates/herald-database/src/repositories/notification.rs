//! PostgreSQL notification repository.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use herald_core::error::{AppError, ErrorKind};
use herald_core::result::AppResult;
use herald_core::types::id::{GroupId, NotificationId, UserId};
use herald_core::types::pagination::{PageRequest, PageResponse};
use herald_entity::notification::model::non_empty_payload;
use herald_entity::{
    NewNotification, Notification, NotificationAction, NotificationView, ReadFilter, Recipient,
};

use crate::store::{NotificationStore, StoreStats};

/// Columns selected for every notification read.
const NOTIFICATION_COLUMNS: &str = "n.id, n.title, n.body, n.category, n.icon, n.color, \
     n.user_id, n.group_id, n.payload, n.actions, n.scheduled_for, n.expires_at, \
     n.created_by, n.created_at";

/// Visibility for recipient `$1` in group `$2` at instant `$3`.
///
/// Scope is resolved by the join itself; broad-scope notifications never
/// need a ledger row to be visible.
const VISIBLE_FROM: &str = "FROM notifications n \
     LEFT JOIN notification_recipients r ON r.notification_id = n.id AND r.user_id = $1 \
     WHERE (n.user_id = $1 \
            OR (n.user_id IS NULL AND n.group_id = $2) \
            OR (n.user_id IS NULL AND n.group_id IS NULL)) \
       AND (n.scheduled_for IS NULL OR n.scheduled_for <= $3) \
       AND (n.expires_at IS NULL OR n.expires_at > $3) \
       AND r.dismissed_at IS NULL";

/// Raw `notifications` row; JSON columns are decoded into entity types.
#[derive(Debug, FromRow)]
struct NotificationRow {
    id: NotificationId,
    title: String,
    body: String,
    category: String,
    icon: String,
    color: String,
    user_id: Option<UserId>,
    group_id: Option<GroupId>,
    payload: Option<serde_json::Value>,
    actions: Option<serde_json::Value>,
    scheduled_for: Option<DateTime<Utc>>,
    expires_at: Option<DateTime<Utc>>,
    created_by: Option<UserId>,
    created_at: DateTime<Utc>,
}

impl TryFrom<NotificationRow> for Notification {
    type Error = AppError;

    fn try_from(row: NotificationRow) -> Result<Self, Self::Error> {
        let actions: Vec<NotificationAction> = match row.actions {
            Some(value) if !value.is_null() => serde_json::from_value(value)?,
            _ => Vec::new(),
        };
        Ok(Self {
            id: row.id,
            title: row.title,
            body: row.body,
            category: row.category.into(),
            icon: row.icon,
            color: row.color,
            user_id: row.user_id,
            group_id: row.group_id,
            payload: non_empty_payload(row.payload),
            actions,
            scheduled_for: row.scheduled_for,
            expires_at: row.expires_at,
            created_by: row.created_by,
            created_at: row.created_at,
        })
    }
}

/// A notification row joined with the reader's ledger columns.
#[derive(Debug, FromRow)]
struct ViewRow {
    #[sqlx(flatten)]
    notification: NotificationRow,
    is_read: bool,
    read_at: Option<DateTime<Utc>>,
}

impl TryFrom<ViewRow> for NotificationView {
    type Error = AppError;

    fn try_from(row: ViewRow) -> Result<Self, Self::Error> {
        Ok(Self {
            notification: row.notification.try_into()?,
            is_read: row.is_read,
            read_at: row.read_at,
        })
    }
}

/// PostgreSQL-backed [`NotificationStore`].
#[derive(Debug, Clone)]
pub struct PgNotificationStore {
    pool: PgPool,
}

impl PgNotificationStore {
    /// Create a new notification repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn store_err(context: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| AppError::with_source(ErrorKind::StoreUnavailable, context, e)
}

fn read_filter_sql(filter: ReadFilter) -> &'static str {
    match filter {
        ReadFilter::All => "",
        ReadFilter::Unread => " AND COALESCE(r.is_read, FALSE) = FALSE",
        ReadFilter::Read => " AND COALESCE(r.is_read, FALSE) = TRUE",
    }
}

#[async_trait]
impl NotificationStore for PgNotificationStore {
    async fn insert(&self, new: NewNotification, now: DateTime<Utc>) -> AppResult<Notification> {
        let notification = new.into_notification(NotificationId::new(), now);
        let actions = if notification.actions.is_empty() {
            None
        } else {
            Some(serde_json::to_value(&notification.actions)?)
        };

        sqlx::query(
            "INSERT INTO notifications (id, title, body, category, icon, color, user_id, group_id, \
             payload, actions, scheduled_for, expires_at, created_by, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)",
        )
        .bind(notification.id)
        .bind(&notification.title)
        .bind(&notification.body)
        .bind(notification.category.as_str())
        .bind(&notification.icon)
        .bind(&notification.color)
        .bind(notification.user_id)
        .bind(notification.group_id)
        .bind(&notification.payload)
        .bind(actions)
        .bind(notification.scheduled_for)
        .bind(notification.expires_at)
        .bind(notification.created_by)
        .bind(notification.created_at)
        .execute(&self.pool)
        .await
        .map_err(store_err("Failed to create notification"))?;

        Ok(notification)
    }

    async fn find_by_id(&self, id: NotificationId) -> AppResult<Option<Notification>> {
        let row = sqlx::query_as::<_, NotificationRow>(&format!(
            "SELECT {NOTIFICATION_COLUMNS} FROM notifications n WHERE n.id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_err("Failed to find notification"))?;

        row.map(Notification::try_from).transpose()
    }

    async fn exists(&self, id: NotificationId) -> AppResult<bool> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM notifications WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(store_err("Failed to check notification"))
    }

    async fn find_due(&self, now: DateTime<Utc>, limit: u64) -> AppResult<Vec<Notification>> {
        let rows = sqlx::query_as::<_, NotificationRow>(&format!(
            "SELECT {NOTIFICATION_COLUMNS} FROM notifications n \
             WHERE n.scheduled_for IS NOT NULL AND n.scheduled_for <= $1 \
               AND (n.expires_at IS NULL OR n.expires_at > $1) \
             ORDER BY n.scheduled_for ASC, n.id ASC LIMIT $2"
        ))
        .bind(now)
        .bind(sql_bigint(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(store_err("Failed to find due notifications"))?;

        rows.into_iter().map(Notification::try_from).collect()
    }

    async fn clear_schedule(&self, id: NotificationId) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE notifications SET scheduled_for = NULL \
             WHERE id = $1 AND scheduled_for IS NOT NULL",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(store_err("Failed to clear schedule"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM notifications WHERE expires_at <= $1")
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(store_err("Failed to purge expired notifications"))?;
        Ok(result.rows_affected())
    }

    async fn list_visible(
        &self,
        recipient: &Recipient,
        filter: ReadFilter,
        now: DateTime<Utc>,
        page: &PageRequest,
    ) -> AppResult<PageResponse<NotificationView>> {
        let filter_sql = read_filter_sql(filter);

        // Count and page must come from one snapshot.
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(store_err("Failed to begin transaction"))?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ READ ONLY")
            .execute(&mut *tx)
            .await
            .map_err(store_err("Failed to set isolation level"))?;

        let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) {VISIBLE_FROM}{filter_sql}"))
            .bind(recipient.user_id)
            .bind(recipient.group_id)
            .bind(now)
            .fetch_one(&mut *tx)
            .await
            .map_err(store_err("Failed to count notifications"))?;

        let rows = sqlx::query_as::<_, ViewRow>(&format!(
            "SELECT {NOTIFICATION_COLUMNS}, COALESCE(r.is_read, FALSE) AS is_read, r.read_at \
             {VISIBLE_FROM}{filter_sql} \
             ORDER BY n.created_at DESC, n.id ASC LIMIT $4 OFFSET $5"
        ))
        .bind(recipient.user_id)
        .bind(recipient.group_id)
        .bind(now)
        .bind(sql_bigint(page.limit))
        .bind(sql_bigint(page.offset()))
        .fetch_all(&mut *tx)
        .await
        .map_err(store_err("Failed to list notifications"))?;

        tx.commit()
            .await
            .map_err(store_err("Failed to commit transaction"))?;

        let items = rows
            .into_iter()
            .map(NotificationView::try_from)
            .collect::<AppResult<Vec<_>>>()?;
        Ok(PageResponse::new(items, page, total.max(0) as u64))
    }

    async fn count_unread(&self, recipient: &Recipient, now: DateTime<Utc>) -> AppResult<u64> {
        let count: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) {VISIBLE_FROM}{}",
            read_filter_sql(ReadFilter::Unread)
        ))
        .bind(recipient.user_id)
        .bind(recipient.group_id)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(store_err("Failed to count unread"))?;
        Ok(count.max(0) as u64)
    }

    async fn stats(&self, now: DateTime<Utc>) -> AppResult<StoreStats> {
        let (total, pending): (i64, i64) = sqlx::query_as(
            "SELECT COUNT(*), COUNT(*) FILTER (WHERE scheduled_for > $1) FROM notifications",
        )
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(store_err("Failed to count notifications"))?;

        let categories: Vec<(String, i64)> = sqlx::query_as(
            "SELECT category, COUNT(*) FROM notifications GROUP BY category ORDER BY category",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(store_err("Failed to count notifications by category"))?;

        Ok(StoreStats {
            total: total.max(0) as u64,
            pending: pending.max(0) as u64,
            by_category: categories
                .into_iter()
                .map(|(category, count)| (category, count.max(0) as u64))
                .collect::<BTreeMap<_, _>>(),
        })
    }
}

/// `LIMIT`/`OFFSET` are BIGINT; clamp instead of wrapping negative.
fn sql_bigint(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row() -> NotificationRow {
        NotificationRow {
            id: NotificationId::new(),
            title: "Reminder".to_string(),
            body: "Appointment in 30 minutes".to_string(),
            category: "appointment_reminder".to_string(),
            icon: "clock".to_string(),
            color: "blue".to_string(),
            user_id: Some(UserId::new()),
            group_id: None,
            payload: Some(json!({})),
            actions: Some(json!([{"label": "View", "action": "view-appointment"}])),
            scheduled_for: None,
            expires_at: None,
            created_by: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_sql_bigint_clamps_instead_of_wrapping() {
        assert_eq!(sql_bigint(25), 25);
        assert_eq!(sql_bigint(u64::MAX), i64::MAX);
        assert_eq!(
            sql_bigint(PageRequest::new(u64::MAX, 10).offset()),
            i64::MAX
        );
    }

    #[test]
    fn test_row_decodes_json_columns() {
        let notification = Notification::try_from(row()).expect("decode");
        assert_eq!(notification.payload, None);
        assert_eq!(notification.actions.len(), 1);
        assert_eq!(notification.actions[0].action, "view-appointment");
        assert_eq!(
            notification.category,
            herald_entity::NotificationCategory::AppointmentReminder
        );
    }

    #[test]
    fn test_malformed_actions_is_serialization_error() {
        let mut bad = row();
        bad.actions = Some(json!({"label": "not a list"}));
        let err = Notification::try_from(bad).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Serialization);
    }

    #[test]
    fn test_read_filter_sql() {
        assert_eq!(read_filter_sql(ReadFilter::All), "");
        assert!(read_filter_sql(ReadFilter::Unread).contains("FALSE) = FALSE"));
        assert!(read_filter_sql(ReadFilter::Read).contains("FALSE) = TRUE"));
    }
}
