//! Core events emitted by the service

use chrono::{DateTime, Local};

/// Events emitted by the focus service
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreEvent {
    /// Manual session started
    SessionStarted {
        lock_end_time: DateTime<Local>,
        total_seconds: u64,
    },

    /// Enforcement paused
    EmergencyUnlocked {
        paused_until: DateTime<Local>,
        used: u32,
        limit: u32,
    },

    /// Manual lock ran out and was cleared
    LockExpired { lock_end_time: DateTime<Local> },

    /// Block lists, schedules or toggles changed
    ConfigChanged,
}
