//! A notification as seen by one recipient.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use herald_core::error::AppError;

use super::model::Notification;
use crate::ledger::LedgerEntry;

/// Read-state filter applied to an annotated listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadFilter {
    /// Everything visible.
    #[default]
    All,
    /// Only notifications the recipient has not read.
    Unread,
    /// Only notifications the recipient has read.
    Read,
}

impl ReadFilter {
    /// Return the filter's wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Unread => "unread",
            Self::Read => "read",
        }
    }

    /// Whether an item with the given read state passes the filter.
    pub fn matches(&self, is_read: bool) -> bool {
        match self {
            Self::All => true,
            Self::Unread => !is_read,
            Self::Read => is_read,
        }
    }
}

impl FromStr for ReadFilter {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Self::All),
            "unread" => Ok(Self::Unread),
            "read" => Ok(Self::Read),
            other => Err(AppError::invalid_input(format!(
                "Unknown filter '{other}'. Expected all, unread, or read"
            ))),
        }
    }
}

impl fmt::Display for ReadFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A visible notification annotated with the recipient's read state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationView {
    /// The shared notification.
    #[serde(flatten)]
    pub notification: Notification,
    /// Whether this recipient has read it. `false` when no ledger row exists.
    pub is_read: bool,
    /// When this recipient read it.
    pub read_at: Option<DateTime<Utc>>,
}

impl NotificationView {
    /// Join a notification with the recipient's ledger row, if any.
    pub fn annotate(notification: Notification, entry: Option<&LedgerEntry>) -> Self {
        Self {
            notification,
            is_read: entry.is_some_and(|e| e.is_read),
            read_at: entry.and_then(|e| e.read_at),
        }
    }
}
