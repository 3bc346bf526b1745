//! Notification entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use herald_core::types::id::{GroupId, NotificationId, UserId};

use super::action::NotificationAction;
use super::category::NotificationCategory;
use super::scope::{NotificationScope, Recipient};
use crate::ledger::LedgerEntry;

/// A notification as stored. Content is immutable after creation; only
/// `scheduled_for` is ever cleared, by the scheduler sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    /// Unique notification identifier.
    pub id: NotificationId,
    /// Headline.
    pub title: String,
    /// Body text.
    pub body: String,
    /// What the notification is about.
    pub category: NotificationCategory,
    /// Icon name, defaulted from the category.
    pub icon: String,
    /// Colour name, defaulted from the category.
    pub color: String,
    /// Single recipient, for user-scoped notifications.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    /// Target group, for group-scoped notifications.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<GroupId>,
    /// Producer-supplied context.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Value>,
    /// Follow-up actions, in display order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<NotificationAction>,
    /// While set and in the future, the notification is held back.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_for: Option<DateTime<Utc>>,
    /// After this instant the notification is hidden and may be purged.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    /// The user who created the notification, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<UserId>,
    /// Creation instant.
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// The notification's scope, derived from its target columns.
    pub fn scope(&self) -> NotificationScope {
        match (self.user_id, self.group_id) {
            (Some(user), _) => NotificationScope::User(user),
            (None, Some(group)) => NotificationScope::Group(group),
            (None, None) => NotificationScope::System,
        }
    }

    /// Whether `scheduled_for` is unset or has elapsed at `now`.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.scheduled_for.is_none_or(|at| at <= now)
    }

    /// Whether the notification is still held back at `now`.
    pub fn is_deferred(&self, now: DateTime<Utc>) -> bool {
        !self.is_due(now)
    }

    /// Whether the notification has expired at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }

    /// Whether the sweep still has to publish this notification.
    pub fn awaits_promotion(&self, now: DateTime<Utc>) -> bool {
        self.scheduled_for.is_some_and(|at| at <= now) && !self.is_expired(now)
    }

    /// Full visibility predicate for one recipient.
    ///
    /// `entry` must be the recipient's own ledger row for this notification.
    pub fn is_visible_to(
        &self,
        recipient: &Recipient,
        entry: Option<&LedgerEntry>,
        now: DateTime<Utc>,
    ) -> bool {
        self.scope().includes(recipient)
            && self.is_due(now)
            && !self.is_expired(now)
            && !entry.is_some_and(LedgerEntry::is_dismissed)
    }
}

/// A validated notification that has not been persisted yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewNotification {
    /// Headline.
    pub title: String,
    /// Body text.
    pub body: String,
    /// What the notification is about.
    pub category: NotificationCategory,
    /// Explicit icon; the category default applies when `None`.
    pub icon: Option<String>,
    /// Explicit colour; the category default applies when `None`.
    pub color: Option<String>,
    /// Target.
    pub scope: NotificationScope,
    /// Producer-supplied context.
    pub payload: Option<serde_json::Value>,
    /// Follow-up actions.
    pub actions: Vec<NotificationAction>,
    /// Deferred delivery instant.
    pub scheduled_for: Option<DateTime<Utc>>,
    /// Expiry instant.
    pub expires_at: Option<DateTime<Utc>>,
    /// Originating user.
    pub created_by: Option<UserId>,
}

impl NewNotification {
    /// Icon to store: the explicit one, else the category default.
    pub fn resolved_icon(&self) -> String {
        non_blank(self.icon.as_deref())
            .unwrap_or(self.category.default_icon())
            .to_string()
    }

    /// Colour to store: the explicit one, else the category default.
    pub fn resolved_color(&self) -> String {
        non_blank(self.color.as_deref())
            .unwrap_or(self.category.default_color())
            .to_string()
    }

    /// Materialize the stored row with its generated identity.
    pub fn into_notification(self, id: NotificationId, created_at: DateTime<Utc>) -> Notification {
        let icon = self.resolved_icon();
        let color = self.resolved_color();
        Notification {
            id,
            title: self.title,
            body: self.body,
            category: self.category,
            icon,
            color,
            user_id: self.scope.user_id(),
            group_id: self.scope.group_id(),
            payload: self.payload,
            actions: self.actions,
            scheduled_for: self.scheduled_for,
            expires_at: self.expires_at,
            created_by: self.created_by,
            created_at,
        }
    }
}

/// Drop structurally empty payloads (`null`, `{}`, `[]`).
pub fn non_empty_payload(value: Option<serde_json::Value>) -> Option<serde_json::Value> {
    value.filter(|v| match v {
        serde_json::Value::Null => false,
        serde_json::Value::Object(map) => !map.is_empty(),
        serde_json::Value::Array(items) => !items.is_empty(),
        _ => true,
    })
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
