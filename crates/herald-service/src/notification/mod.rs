//! Notification creation, reads, and recipient state.

pub mod producers;
pub mod request;
pub mod resolver;
pub mod service;

pub use request::CreateNotificationRequest;
pub use resolver::ScopeResolver;
pub use service::{NotificationService, NotificationStats};
