//! Background sweep for the notification engine.
//!
//! This crate provides:
//! - The sweep itself: promotion of due deferred notifications, expiry
//!   purge, and ledger vacuuming
//! - An interval runner that ticks until a cancel signal arrives
//! - A cron scheduler for deployments that want wall-clock schedules

pub mod runner;
pub mod scheduler;
pub mod sweep;

pub use runner::SweepRunner;
pub use scheduler::SweepScheduler;
pub use sweep::{SchedulerSweep, SweepReport};
