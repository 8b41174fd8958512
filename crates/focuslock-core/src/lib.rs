//! Focus session state engine for focuslock
//!
//! This crate is the heart of focuslock, containing:
//! - Schedule matching and lock state resolution (pure functions of a
//!   configuration snapshot and the clock)
//! - Countdown computation
//! - The two-step session request flow
//! - The store-backed focus service and its lock guards
//! - The engine monitor that keeps a frontend's view current

mod backend;
mod blocklist;
mod engine;
mod events;
mod import;
mod monitor;
mod schedule;
mod service;
mod session;
mod timer;
mod vpn;

pub use backend::*;
pub use blocklist::*;
pub use engine::*;
pub use events::*;
pub use import::*;
pub use monitor::*;
pub use schedule::*;
pub use service::*;
pub use session::*;
pub use timer::*;
pub use vpn::*;
