//! Recipient ledger entities.

pub mod model;

pub use model::{LedgerEntry, LedgerTransition};
