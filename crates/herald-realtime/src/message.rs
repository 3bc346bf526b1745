//! Wire format published on the bus.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use herald_core::result::AppResult;
use herald_core::types::id::NotificationId;
use herald_entity::{Notification, NotificationAction, NotificationCategory};

/// The flat message a live client receives for one notification.
///
/// Scope and scheduling fields are not part of the message: the subject it
/// arrives on already says who it is for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationMessage {
    /// Notification id; clients de-duplicate on it.
    pub id: NotificationId,
    /// Headline.
    pub title: String,
    /// Body text.
    pub body: String,
    /// Category wire name.
    pub category: NotificationCategory,
    /// Icon name.
    pub icon: String,
    /// Colour name.
    pub color: String,
    /// Creation instant.
    pub created_at: DateTime<Utc>,
    /// Producer-supplied context.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Value>,
    /// Follow-up actions.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<NotificationAction>,
}

impl NotificationMessage {
    /// Serialize to the JSON text put on the bus.
    pub fn to_json(&self) -> AppResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

impl From<&Notification> for NotificationMessage {
    fn from(n: &Notification) -> Self {
        Self {
            id: n.id,
            title: n.title.clone(),
            body: n.body.clone(),
            category: n.category.clone(),
            icon: n.icon.clone(),
            color: n.color.clone(),
            created_at: n.created_at,
            payload: n.payload.clone(),
            actions: n.actions.clone(),
        }
    }
}
