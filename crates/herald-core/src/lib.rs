//! # herald-core
//!
//! Core crate for Herald, the notification distribution engine. Contains
//! configuration schemas, typed identifiers, pagination types, the clock
//! abstraction, the message bus trait, and the unified error system.
//!
//! This crate has **no** internal dependencies on other Herald crates.

pub mod clock;
pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{AppError, ErrorKind};
pub use result::AppResult;
pub use traits::MessageBus;
