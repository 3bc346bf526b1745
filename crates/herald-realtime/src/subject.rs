//! Bus subject definitions and parsing.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use herald_core::types::id::{GroupId, UserId};
use herald_entity::NotificationScope;

/// Subject carrying system-wide notifications.
pub const SYSTEM_SUBJECT: &str = "system";

/// Typed bus subjects. Each notification maps to exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum Subject {
    /// Personal subject of one user.
    User(UserId),
    /// Subject shared by every member of a group.
    Group(GroupId),
    /// Subject every client listens on.
    System,
}

impl Subject {
    /// The subject a notification with this scope is published on.
    pub fn for_scope(scope: &NotificationScope) -> Self {
        match scope {
            NotificationScope::User(id) => Self::User(*id),
            NotificationScope::Group(id) => Self::Group(*id),
            NotificationScope::System => Self::System,
        }
    }

    /// Parses an unprefixed subject string.
    pub fn parse(subject: &str) -> Option<Self> {
        let parts: Vec<&str> = subject.splitn(2, '/').collect();
        match parts.as_slice() {
            ["user", id] => Uuid::parse_str(id).ok().map(|u| Self::User(UserId::from(u))),
            ["group", id] => Uuid::parse_str(id).ok().map(|u| Self::Group(GroupId::from(u))),
            [SYSTEM_SUBJECT] => Some(Self::System),
            _ => None,
        }
    }

    /// Parses a subject string carrying a deployment prefix.
    pub fn parse_prefixed(subject: &str, prefix: &str) -> Option<Self> {
        let prefix = prefix.trim_matches('/');
        if prefix.is_empty() {
            return Self::parse(subject);
        }
        subject
            .strip_prefix(prefix)
            .and_then(|rest| rest.strip_prefix('/'))
            .and_then(Self::parse)
    }

    /// Converts back to a subject string.
    pub fn to_subject_string(&self) -> String {
        match self {
            Self::User(id) => format!("user/{id}"),
            Self::Group(id) => format!("group/{id}"),
            Self::System => SYSTEM_SUBJECT.to_string(),
        }
    }

    /// Subject string with a deployment prefix joined by `/`.
    pub fn with_prefix(&self, prefix: &str) -> String {
        let prefix = prefix.trim_matches('/');
        if prefix.is_empty() {
            self.to_subject_string()
        } else {
            format!("{prefix}/{}", self.to_subject_string())
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_subject_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_selects_one_family() {
        let user = UserId::new();
        let group = GroupId::new();
        assert_eq!(
            Subject::for_scope(&NotificationScope::User(user)).to_subject_string(),
            format!("user/{user}")
        );
        assert_eq!(
            Subject::for_scope(&NotificationScope::Group(group)).to_subject_string(),
            format!("group/{group}")
        );
        assert_eq!(
            Subject::for_scope(&NotificationScope::System).to_subject_string(),
            "system"
        );
    }

    #[test]
    fn test_parse_round_trip() {
        let subject = Subject::Group(GroupId::new());
        assert_eq!(Subject::parse(&subject.to_subject_string()), Some(subject));
        assert_eq!(Subject::parse("system"), Some(Subject::System));
        assert_eq!(Subject::parse("user/42"), None);
        assert_eq!(Subject::parse("folder/x"), None);
    }

    #[test]
    fn test_prefix() {
        let user = UserId::new();
        let subject = Subject::User(user);
        let rendered = subject.with_prefix("clinic-a/");
        assert_eq!(rendered, format!("clinic-a/user/{user}"));
        assert_eq!(Subject::parse_prefixed(&rendered, "clinic-a"), Some(subject));
        assert_eq!(Subject::parse_prefixed(&rendered, "clinic-b"), None);
        assert_eq!(Subject::System.with_prefix(""), "system");
    }
}
