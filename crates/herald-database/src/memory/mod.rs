//! In-process store with the same semantics as the PostgreSQL repositories.

pub mod store;

pub use store::MemoryStore;
