//! focuslockd - the focus-lock background service
//!
//! Wires together:
//! - Configuration loading
//! - Store initialization
//! - The focus service and its housekeeping tick
//! - The static app catalog
//! - IPC server

mod daemon;
mod handlers;

pub use daemon::*;
pub use handlers::*;
