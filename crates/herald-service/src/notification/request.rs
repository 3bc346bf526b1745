//! Producer-facing creation request and its validation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use herald_core::error::AppError;
use herald_core::result::AppResult;
use herald_core::types::id::{GroupId, UserId};
use herald_entity::notification::model::non_empty_payload;
use herald_entity::{NewNotification, NotificationAction, NotificationCategory, NotificationScope};

/// Widest category name the store accepts.
pub const MAX_CATEGORY_LEN: usize = 50;

/// Everything a producer may say about a new notification.
///
/// Setting neither `user_id` nor `group_id` addresses every user.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct CreateNotificationRequest {
    /// Headline.
    #[validate(
        length(min = 1, max = 255, message = "Title is required"),
        custom(function = "not_blank", message = "Title is required")
    )]
    pub title: String,
    /// Body text.
    #[validate(
        length(min = 1, message = "Body is required"),
        custom(function = "not_blank", message = "Body is required")
    )]
    pub body: String,
    /// Category; drives default presentation.
    #[serde(default)]
    pub category: NotificationCategory,
    /// Explicit icon.
    #[serde(default)]
    #[validate(length(min = 1, max = 50, message = "Icon must be 1-50 characters"))]
    pub icon: Option<String>,
    /// Explicit colour.
    #[serde(default)]
    #[validate(length(min = 1, max = 20, message = "Color must be 1-20 characters"))]
    pub color: Option<String>,
    /// Single recipient.
    #[serde(default)]
    pub user_id: Option<UserId>,
    /// Target group.
    #[serde(default)]
    pub group_id: Option<GroupId>,
    /// Producer context.
    #[serde(default)]
    pub payload: Option<serde_json::Value>,
    /// Follow-up actions.
    #[serde(default)]
    pub actions: Vec<NotificationAction>,
    /// Deferred delivery instant.
    #[serde(default)]
    pub scheduled_for: Option<DateTime<Utc>>,
    /// Expiry instant.
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    /// Originating user.
    #[serde(default)]
    pub created_by: Option<UserId>,
}

impl CreateNotificationRequest {
    /// Start a system-wide request.
    pub fn new(
        title: impl Into<String>,
        body: impl Into<String>,
        category: NotificationCategory,
    ) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            category,
            ..Self::default()
        }
    }

    /// Address a single user.
    pub fn for_user(mut self, user_id: UserId) -> Self {
        self.user_id = Some(user_id);
        self
    }

    /// Address every member of a group.
    pub fn for_group(mut self, group_id: GroupId) -> Self {
        self.group_id = Some(group_id);
        self
    }

    /// Attach producer context.
    pub fn payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Append a follow-up action.
    pub fn action(mut self, action: NotificationAction) -> Self {
        self.actions.push(action);
        self
    }

    /// Override the category icon.
    pub fn icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    /// Override the category colour.
    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// Hold the notification back until `at`.
    pub fn scheduled_for(mut self, at: DateTime<Utc>) -> Self {
        self.scheduled_for = Some(at);
        self
    }

    /// Hide and purge the notification from `at` on.
    pub fn expires_at(mut self, at: DateTime<Utc>) -> Self {
        self.expires_at = Some(at);
        self
    }

    /// Record the originating user.
    pub fn created_by(mut self, user_id: UserId) -> Self {
        self.created_by = Some(user_id);
        self
    }

    /// Validate and convert into a storable notification.
    ///
    /// Scope is checked first, so a request with both targets fails with
    /// `InvalidScope` regardless of its other fields.
    pub fn into_new_notification(self) -> AppResult<NewNotification> {
        let scope = NotificationScope::from_parts(self.user_id, self.group_id)?;
        self.validate()
            .map_err(|e| AppError::invalid_input(format!("Invalid notification: {e}")))?;
        let category_len = self.category.as_str().chars().count();
        if category_len == 0 || category_len > MAX_CATEGORY_LEN {
            return Err(AppError::invalid_input(format!(
                "Invalid notification: category must be 1-{MAX_CATEGORY_LEN} characters"
            )));
        }

        Ok(NewNotification {
            title: self.title,
            body: self.body,
            category: self.category,
            icon: self.icon,
            color: self.color,
            scope,
            payload: non_empty_payload(self.payload),
            actions: self.actions,
            scheduled_for: self.scheduled_for,
            expires_at: self.expires_at,
            created_by: self.created_by,
        })
    }
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::new("blank"))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use herald_core::error::ErrorKind;

    use super::*;

    #[test]
    fn test_both_targets_rejected_before_content() {
        let err = CreateNotificationRequest::new("", "", NotificationCategory::Info)
            .for_user(UserId::new())
            .for_group(GroupId::new())
            .into_new_notification()
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidScope);
    }

    #[test]
    fn test_missing_title_or_body() {
        let err = CreateNotificationRequest::new("", "body", NotificationCategory::Info)
            .into_new_notification()
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidInput);

        let err = CreateNotificationRequest::new("Title", "   ", NotificationCategory::Info)
            .into_new_notification()
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidInput);

        let long = "x".repeat(256);
        let err = CreateNotificationRequest::new(long, "body", NotificationCategory::Info)
            .into_new_notification()
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidInput);
    }

    #[test]
    fn test_presentation_fields_bounded_by_column_widths() {
        let err = CreateNotificationRequest::new("Title", "Body", NotificationCategory::Info)
            .icon("i".repeat(51))
            .into_new_notification()
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidInput);

        let err = CreateNotificationRequest::new("Title", "Body", NotificationCategory::Info)
            .color("c".repeat(21))
            .into_new_notification()
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidInput);

        let err = CreateNotificationRequest::new(
            "Title",
            "Body",
            NotificationCategory::from("k".repeat(MAX_CATEGORY_LEN + 1)),
        )
        .into_new_notification()
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidInput);

        let new = CreateNotificationRequest::new(
            "Title",
            "Body",
            NotificationCategory::from("k".repeat(MAX_CATEGORY_LEN)),
        )
        .icon("i".repeat(50))
        .color("c".repeat(20))
        .into_new_notification()
        .expect("valid");
        assert_eq!(new.category.as_str().len(), MAX_CATEGORY_LEN);
    }

    #[test]
    fn test_empty_payload_dropped() {
        let new = CreateNotificationRequest::new("Title", "Body", NotificationCategory::Info)
            .for_group(GroupId::new())
            .payload(json!({}))
            .into_new_notification()
            .expect("valid");
        assert!(new.payload.is_none());
        assert!(matches!(new.scope, NotificationScope::Group(_)));
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let req: CreateNotificationRequest = serde_json::from_value(json!({
            "title": "Low stock",
            "body": "Gauze below threshold",
            "category": "inventory-alert"
        }))
        .expect("parse");
        assert_eq!(req.category, NotificationCategory::InventoryAlert);
        let new = req.into_new_notification().expect("valid");
        assert_eq!(new.scope, NotificationScope::System);
        assert_eq!(new.resolved_icon(), "box");
    }
}
