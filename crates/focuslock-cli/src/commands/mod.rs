pub mod blocklist;
pub mod schedule;
pub mod session;
pub mod settings;
