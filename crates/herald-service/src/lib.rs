//! # herald-service
//!
//! Business logic for the notification engine. The service orchestrates
//! the store, the recipient ledger, the scope resolver, and the
//! distribution publisher to implement the producer-facing creation call
//! and the client-facing read API.
//!
//! Services follow constructor injection: all dependencies are provided
//! at construction time.

pub mod context;
pub mod notification;

pub use context::RequestContext;
pub use notification::{
    CreateNotificationRequest, NotificationService, NotificationStats, ScopeResolver, producers,
};
