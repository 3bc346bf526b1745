//! PostgreSQL repository implementations of the storage traits.

pub mod ledger;
pub mod notification;

pub use ledger::PgRecipientLedger;
pub use notification::PgNotificationStore;
