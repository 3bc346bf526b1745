//! Core traits defined in `herald-core` and implemented by other crates.

pub mod bus;

pub use bus::MessageBus;
