//! Notification domain entities.

pub mod action;
pub mod category;
pub mod model;
pub mod scope;
pub mod view;

pub use action::NotificationAction;
pub use category::NotificationCategory;
pub use model::{NewNotification, Notification};
pub use scope::{NotificationScope, Recipient};
pub use view::{NotificationView, ReadFilter};
