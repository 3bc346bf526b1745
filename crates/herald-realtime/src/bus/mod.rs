//! Message bus backends and the client that selects one.

pub mod client;
pub mod memory;
#[cfg(feature = "redis-bus")]
pub mod redis;

pub use client::BusClient;
pub use memory::MemoryBus;
#[cfg(feature = "redis-bus")]
pub use redis::RedisBus;
