//! Per-(notification, user) read and dismissal state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use herald_core::types::id::{NotificationId, UserId};

/// One row of the sparse recipient ledger.
///
/// Rows exist only for users who have interacted with a notification.
/// Absence means "unread, not dismissed".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct LedgerEntry {
    /// The notification this row tracks.
    pub notification_id: NotificationId,
    /// The user this row belongs to.
    pub user_id: UserId,
    /// Whether the user has read the notification.
    pub is_read: bool,
    /// When the user read it.
    pub read_at: Option<DateTime<Utc>>,
    /// When the user dismissed it. Dismissal is permanent.
    pub dismissed_at: Option<DateTime<Utc>>,
    /// When the row was first written.
    pub created_at: DateTime<Utc>,
    /// When the row last changed.
    pub updated_at: DateTime<Utc>,
}

impl LedgerEntry {
    /// A fresh row recording a read at `now`.
    pub fn read(notification_id: NotificationId, user_id: UserId, now: DateTime<Utc>) -> Self {
        Self {
            notification_id,
            user_id,
            is_read: true,
            read_at: Some(now),
            dismissed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// A fresh row recording a dismissal at `now`, which also counts as read.
    pub fn dismissed(notification_id: NotificationId, user_id: UserId, now: DateTime<Utc>) -> Self {
        Self {
            dismissed_at: Some(now),
            ..Self::read(notification_id, user_id, now)
        }
    }

    /// Whether the row carries a dismissal.
    pub fn is_dismissed(&self) -> bool {
        self.dismissed_at.is_some()
    }

    /// Apply a read at `now`.
    pub fn mark_read(&mut self, now: DateTime<Utc>) -> LedgerTransition {
        if self.is_read {
            return LedgerTransition::Unchanged;
        }
        self.is_read = true;
        self.read_at = Some(now);
        self.updated_at = now;
        LedgerTransition::Updated
    }

    /// Apply a dismissal at `now`. Read state is left as it is.
    pub fn dismiss(&mut self, now: DateTime<Utc>) -> LedgerTransition {
        if self.is_dismissed() {
            return LedgerTransition::Unchanged;
        }
        self.dismissed_at = Some(now);
        self.updated_at = now;
        LedgerTransition::Updated
    }
}

/// What an idempotent ledger upsert did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerTransition {
    /// No row existed; one was inserted.
    Created,
    /// An existing row changed state.
    Updated,
    /// The row was already in the requested state.
    Unchanged,
}

impl LedgerTransition {
    /// Whether the call changed anything.
    pub fn changed(&self) -> bool {
        !matches!(self, Self::Unchanged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mark_read_is_idempotent() {
        let now = Utc::now();
        let mut entry = LedgerEntry::read(NotificationId::new(), UserId::new(), now);
        entry.is_read = false;
        entry.read_at = None;
        assert_eq!(entry.mark_read(now), LedgerTransition::Updated);
        assert_eq!(entry.mark_read(now), LedgerTransition::Unchanged);
        assert!(entry.is_read);
    }

    #[test]
    fn test_dismiss_keeps_first_timestamp() {
        let now = Utc::now();
        let later = now + chrono::Duration::seconds(5);
        let mut entry = LedgerEntry::read(NotificationId::new(), UserId::new(), now);
        assert_eq!(entry.dismiss(now), LedgerTransition::Updated);
        assert_eq!(entry.dismiss(later), LedgerTransition::Unchanged);
        assert_eq!(entry.dismissed_at, Some(now));
    }

    #[test]
    fn test_dismissed_row_counts_as_read() {
        let entry = LedgerEntry::dismissed(NotificationId::new(), UserId::new(), Utc::now());
        assert!(entry.is_read);
        assert!(entry.is_dismissed());
    }
}
