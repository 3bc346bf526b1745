//! # herald-database
//!
//! Persistence for the notification engine: the [`NotificationStore`] and
//! [`RecipientLedger`] traits, their PostgreSQL repositories, and an
//! in-process [`MemoryStore`] with identical semantics.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use memory::MemoryStore;
pub use repositories::{PgNotificationStore, PgRecipientLedger};
pub use store::{LedgerStats, NotificationStore, RecipientLedger, StoreStats, Stores};
