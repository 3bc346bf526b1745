//! # herald-realtime
//!
//! Live-push side of the notification engine:
//!
//! - Typed bus subjects (`user/{id}`, `group/{id}`, `system`)
//! - The flat wire message published for each notification
//! - In-process and Redis message bus backends
//! - A bus client with an explicit "not configured" state
//! - The fire-and-forget distribution publisher

pub mod bus;
pub mod message;
pub mod publisher;
pub mod subject;

pub use bus::{BusClient, MemoryBus};
pub use message::NotificationMessage;
pub use publisher::DistributionPublisher;
pub use subject::Subject;
