//! Notification targeting.

use serde::{Deserialize, Serialize};

use herald_core::error::AppError;
use herald_core::types::id::{GroupId, UserId};

/// Who a notification is addressed to. Exactly one variant applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "scope", content = "id", rename_all = "snake_case")]
pub enum NotificationScope {
    /// A single user.
    User(UserId),
    /// Every member of one tenant group.
    Group(GroupId),
    /// Every user.
    System,
}

impl NotificationScope {
    /// Build a scope from the two optional target columns.
    ///
    /// Fails with `InvalidScope` when both are set.
    pub fn from_parts(user_id: Option<UserId>, group_id: Option<GroupId>) -> Result<Self, AppError> {
        match (user_id, group_id) {
            (Some(_), Some(_)) => Err(AppError::invalid_scope(
                "user_id and group_id are mutually exclusive",
            )),
            (Some(user), None) => Ok(Self::User(user)),
            (None, Some(group)) => Ok(Self::Group(group)),
            (None, None) => Ok(Self::System),
        }
    }

    /// The targeted user, if user-scoped.
    pub fn user_id(&self) -> Option<UserId> {
        match self {
            Self::User(id) => Some(*id),
            _ => None,
        }
    }

    /// The targeted group, if group-scoped.
    pub fn group_id(&self) -> Option<GroupId> {
        match self {
            Self::Group(id) => Some(*id),
            _ => None,
        }
    }

    /// Whether `recipient` falls inside this scope.
    pub fn includes(&self, recipient: &Recipient) -> bool {
        match self {
            Self::User(id) => *id == recipient.user_id,
            Self::Group(id) => recipient.group_id == Some(*id),
            Self::System => true,
        }
    }
}

/// The user a read-path query is evaluated for.
///
/// Group membership is resolved upstream (the user directory lives outside
/// the engine) and handed in with the user id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Recipient {
    /// The user.
    pub user_id: UserId,
    /// The tenant group the user belongs to, if any.
    pub group_id: Option<GroupId>,
}

impl Recipient {
    /// A recipient with a group.
    pub fn new(user_id: UserId, group_id: Option<GroupId>) -> Self {
        Self { user_id, group_id }
    }

    /// A recipient that belongs to no group.
    pub fn ungrouped(user_id: UserId) -> Self {
        Self {
            user_id,
            group_id: None,
        }
    }
}
