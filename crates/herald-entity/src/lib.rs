//! # herald-entity
//!
//! Domain entity models for Herald. Every struct in this crate represents
//! a database table row or a domain value object. Database entities
//! additionally derive `sqlx::FromRow`.

pub mod ledger;
pub mod notification;

pub use ledger::{LedgerEntry, LedgerTransition};
pub use notification::{
    NewNotification, Notification, NotificationAction, NotificationCategory, NotificationScope,
    NotificationView, ReadFilter, Recipient,
};
