//! Event types for focuslockd -> client streaming

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::{FocusStatus, API_VERSION};

/// Event envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub api_version: u32,
    pub timestamp: DateTime<Local>,
    pub payload: EventPayload,
}

impl Event {
    pub fn new(payload: EventPayload) -> Self {
        Self {
            api_version: API_VERSION,
            timestamp: focuslock_util::now(),
            payload,
        }
    }
}

/// All possible events from the service to clients
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventPayload {
    /// Enforcement state changed (lock started, expired, paused, resumed)
    StateChanged(FocusStatus),

    /// A manual session was started
    SessionStarted {
        lock_end_time: DateTime<Local>,
        total_seconds: u64,
    },

    /// Enforcement paused by an emergency unlock
    EmergencyUnlocked {
        paused_until: DateTime<Local>,
        used: u32,
        limit: u32,
    },

    /// Block lists or schedules changed; clients should refetch
    ConfigChanged,

    /// Service is shutting down
    Shutdown,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_serialization() {
        let event = Event::new(EventPayload::SessionStarted {
            lock_end_time: focuslock_util::now(),
            total_seconds: 1800,
        });

        let json = serde_json::to_string(&event).unwrap();
        let parsed: Event = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.api_version, API_VERSION);
        assert!(matches!(
            parsed.payload,
            EventPayload::SessionStarted { total_seconds: 1800, .. }
        ));
    }

    #[test]
    fn unit_events_carry_type_tag() {
        let json = serde_json::to_string(&EventPayload::ConfigChanged).unwrap();
        assert_eq!(json, r#"{"type":"config_changed"}"#);
    }
}
