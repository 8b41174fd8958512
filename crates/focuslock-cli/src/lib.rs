//! Client side of focuslock
//!
//! - [`DaemonBackend`]: the backend boundary implemented over the daemon
//!   socket
//! - [`confirm_with_retry`]: starting a proposed session, with retries
//! - Rendering helpers for status lines, schedules and the session
//!   confirmation prompt

mod backend;
mod confirm;
mod render;

pub use backend::*;
pub use confirm::*;
pub use render::*;
