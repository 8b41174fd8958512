//! Audit event types

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Types of audit events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuditEventType {
    /// Service started
    ServiceStarted,

    /// Service stopped
    ServiceStopped,

    /// Manual session started
    SessionStarted {
        total_seconds: u64,
        lock_end_time: DateTime<Local>,
    },

    /// Manual lock ran out and was cleared
    LockExpired { lock_end_time: DateTime<Local> },

    /// Enforcement paused
    EmergencyUnlock {
        paused_until: DateTime<Local>,
        used: u32,
    },

    /// Schedule list replaced
    SchedulesSaved { count: usize },

    /// Blocked apps, sites or the VPN toggle changed
    BlockListChanged { apps: usize, sites: usize, block_common_vpn: bool },

    /// Settings merged from an import
    SettingsImported {
        apps_added: usize,
        sites_added: usize,
        schedules_added: usize,
    },

    /// Client connected
    ClientConnected {
        client_id: String,
        role: String,
        uid: Option<u32>,
    },

    /// Client disconnected
    ClientDisconnected { client_id: String },
}

/// Full audit event with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Unique event ID
    pub id: i64,

    /// Event timestamp
    pub timestamp: DateTime<Local>,

    /// Event type and details
    pub event: AuditEventType,
}

impl AuditEvent {
    pub fn new(event: AuditEventType) -> Self {
        Self {
            id: 0, // Will be set by store
            timestamp: focuslock_util::now(),
            event,
        }
    }
}
