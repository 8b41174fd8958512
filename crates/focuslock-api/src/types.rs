//! Shared types for the focuslockd API

use chrono::{DateTime, Local};
use focuslock_util::{DayTag, DaysOfWeek, ScheduleId, TimeWindow, WallClock};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A recurring weekly lock window
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    pub id: ScheduleId,
    pub name: String,
    pub days: Vec<DayTag>,
    pub start_time: WallClock,
    pub end_time: WallClock,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Schedule {
    /// Create an enabled schedule with a freshly generated id
    pub fn new(
        name: impl Into<String>,
        days: Vec<DayTag>,
        start_time: WallClock,
        end_time: WallClock,
    ) -> Self {
        Self {
            id: ScheduleId::generate(),
            name: name.into(),
            days,
            start_time,
            end_time,
            enabled: true,
        }
    }

    pub fn window(&self) -> TimeWindow {
        TimeWindow::new(
            DaysOfWeek::from_tags(&self.days),
            self.start_time,
            self.end_time,
        )
    }

    pub fn reference(&self) -> ScheduleRef {
        ScheduleRef {
            id: self.id.clone(),
            name: self.name.clone(),
        }
    }
}

/// Identifies the schedule behind a scheduled lock
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleRef {
    pub id: ScheduleId,
    pub name: String,
}

/// Usage counters, keyed by executable or domain
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    /// Times the enforcer terminated a blocked process
    #[serde(default)]
    pub kill_counts: BTreeMap<String, u64>,
    /// Sessions in which an app was on the block list
    #[serde(default)]
    pub blocked_frequency: BTreeMap<String, u64>,
    /// Total seconds an app has been blocked by sessions
    #[serde(default)]
    pub blocked_duration: BTreeMap<String, u64>,
}

/// Persisted focus-lock configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigSnapshot {
    #[serde(default)]
    pub blocked_apps: Vec<String>,
    #[serde(default)]
    pub blocked_sites: Vec<String>,
    #[serde(default = "default_true")]
    pub block_common_vpn: bool,
    #[serde(default)]
    pub schedules: Vec<Schedule>,
    /// Expiry of the manual session; inert once in the past
    #[serde(default)]
    pub lock_end_time: Option<DateTime<Local>>,
    #[serde(default)]
    pub paused_until: Option<DateTime<Local>>,
    /// Emergency unlocks spent in the current manual session
    #[serde(default)]
    pub emergency_unlocks_used: u32,
    #[serde(default)]
    pub stats: Stats,
}

impl Default for ConfigSnapshot {
    fn default() -> Self {
        Self {
            blocked_apps: Vec::new(),
            blocked_sites: Vec::new(),
            block_common_vpn: true,
            schedules: Vec::new(),
            lock_end_time: None,
            paused_until: None,
            emergency_unlocks_used: 0,
            stats: Stats::default(),
        }
    }
}

fn default_true() -> bool {
    true
}

/// Current enforcement state, derived from a snapshot and the clock
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum EnforcementState {
    Unlocked,
    LockedManual {
        end_time: DateTime<Local>,
    },
    LockedScheduled {
        end_time: DateTime<Local>,
        schedule: ScheduleRef,
    },
    Paused {
        until: DateTime<Local>,
    },
}

impl EnforcementState {
    /// Instant at which this state ends on its own, if any
    pub fn end_time(&self) -> Option<DateTime<Local>> {
        match self {
            EnforcementState::Unlocked => None,
            EnforcementState::LockedManual { end_time } => Some(*end_time),
            EnforcementState::LockedScheduled { end_time, .. } => Some(*end_time),
            EnforcementState::Paused { until } => Some(*until),
        }
    }

    pub fn is_locked(&self) -> bool {
        matches!(
            self,
            EnforcementState::LockedManual { .. } | EnforcementState::LockedScheduled { .. }
        )
    }

    /// Same variant, ignoring end times and schedule details
    pub fn same_kind(&self, other: &EnforcementState) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }
}

/// Time left until an end time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Remaining {
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
    pub total_seconds: u64,
}

impl Remaining {
    pub fn from_seconds(total_seconds: u64) -> Self {
        Self {
            hours: total_seconds / 3600,
            minutes: (total_seconds % 3600) / 60,
            seconds: total_seconds % 60,
            total_seconds,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.total_seconds == 0
    }

    /// Minutes to show to the user.
    ///
    /// Rounds up to 1 in the final minute so a running lock never reads
    /// "0 min".
    pub fn display_minutes(&self) -> u64 {
        if self.hours == 0 && self.minutes == 0 && self.total_seconds > 0 {
            1
        } else {
            self.minutes
        }
    }

    /// Short human form, e.g. "1 hr 5 min" or "3 min"
    pub fn humanize(&self) -> String {
        let minutes = self.display_minutes();
        match (self.hours, minutes) {
            (0, m) => format!("{} min", m),
            (h, 0) => format!("{} hr", h),
            (h, m) => format!("{} hr {} min", h, m),
        }
    }

    /// Clock form, e.g. "01:05:09"
    pub fn clock(&self) -> String {
        format!("{:02}:{:02}:{:02}", self.hours, self.minutes, self.seconds)
    }
}

/// Installed application, for display next to block-list entries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppInfo {
    pub name: String,
    pub exe: String,
    #[serde(default)]
    pub icon: Option<String>,
}

/// State view returned by `GetState` and broadcast on transitions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FocusStatus {
    pub api_version: u32,
    pub state: EnforcementState,
    /// Time left in `state`; absent when unlocked
    pub remaining: Option<Remaining>,
    /// A manual lock or schedule is active, even if paused
    pub session_in_force: bool,
    pub emergency_unlocks_used: u32,
    pub emergency_unlock_limit: u32,
}

/// Everything the enforcer should block right now
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectiveBlocklist {
    pub apps: Vec<String>,
    pub sites: Vec<String>,
}

/// What an import added to the configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub apps_added: usize,
    pub sites_added: usize,
    pub schedules_added: usize,
}

/// Role for authorization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientRole {
    /// Interactive user - can start sessions and edit the configuration
    Shell,
    /// Local admin (root) - can also report enforcement events
    Admin,
    /// Read-only observer
    Observer,
}

impl ClientRole {
    pub fn can_modify(&self) -> bool {
        matches!(self, ClientRole::Shell | ClientRole::Admin)
    }

    pub fn can_report(&self) -> bool {
        matches!(self, ClientRole::Shell | ClientRole::Admin)
    }
}

/// Health status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub live: bool,
    pub ready: bool,
    pub store_ok: bool,
    pub catalog_ok: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_field_names() {
        let json = serde_json::to_value(ConfigSnapshot::default()).unwrap();
        let obj = json.as_object().unwrap();
        for key in [
            "blocked_apps",
            "blocked_sites",
            "block_common_vpn",
            "schedules",
            "lock_end_time",
            "paused_until",
            "emergency_unlocks_used",
            "stats",
        ] {
            assert!(obj.contains_key(key), "missing {}", key);
        }
        assert_eq!(obj["block_common_vpn"], serde_json::Value::Bool(true));
    }

    #[test]
    fn snapshot_missing_fields_use_defaults() {
        let parsed: ConfigSnapshot = serde_json::from_str(r#"{"blocked_apps":["steam.exe"]}"#).unwrap();
        assert_eq!(parsed.blocked_apps, vec!["steam.exe".to_string()]);
        assert!(parsed.block_common_vpn);
        assert!(parsed.lock_end_time.is_none());
        assert!(parsed.stats.kill_counts.is_empty());
    }

    #[test]
    fn schedule_wire_format() {
        let json = r#"{
            "id": "a1",
            "name": "Work",
            "days": ["Mon", "Tue"],
            "start_time": "09:00",
            "end_time": "17:00",
            "enabled": true
        }"#;
        let schedule: Schedule = serde_json::from_str(json).unwrap();
        assert_eq!(schedule.id, ScheduleId::new("a1"));
        assert_eq!(schedule.days, vec![DayTag::Mon, DayTag::Tue]);
        assert_eq!(schedule.start_time, WallClock::new(9, 0).unwrap());
        assert_eq!(schedule.reference().name, "Work");
    }

    #[test]
    fn remaining_display_rounds_final_minute_up() {
        let r = Remaining::from_seconds(30);
        assert_eq!(r.minutes, 0);
        assert_eq!(r.display_minutes(), 1);
        assert_eq!(r.humanize(), "1 min");

        assert_eq!(Remaining::from_seconds(0).display_minutes(), 0);
        assert_eq!(Remaining::from_seconds(3900).humanize(), "1 hr 5 min");
        assert_eq!(Remaining::from_seconds(7200).humanize(), "2 hr");
        assert_eq!(Remaining::from_seconds(3909).clock(), "01:05:09");
    }

    #[test]
    fn enforcement_state_tagging() {
        let json = serde_json::to_string(&EnforcementState::Unlocked).unwrap();
        assert_eq!(json, r#"{"state":"unlocked"}"#);

        let now = focuslock_util::now();
        let a = EnforcementState::LockedManual { end_time: now };
        let b = EnforcementState::LockedManual {
            end_time: now + chrono::Duration::minutes(5),
        };
        assert!(a.same_kind(&b));
        assert!(a.is_locked());
        assert!(!a.same_kind(&EnforcementState::Paused { until: now }));
    }
}
