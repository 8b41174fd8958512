//! Shared utilities for focuslock
//!
//! This crate provides:
//! - ID types (ScheduleId, ClientId)
//! - Time utilities (mockable local clock, weekday tags, HH:MM wall clock)
//! - Error types
//! - Rate limiting helpers
//! - Default paths for socket, config, and data directories

mod error;
mod ids;
mod paths;
mod rate_limit;
mod time;

pub use error::*;
pub use ids::*;
pub use paths::*;
pub use rate_limit::*;
pub use time::*;
