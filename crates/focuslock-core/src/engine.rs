//! Lock state resolution
//!
//! The enforcement state is a pure function of a configuration snapshot and
//! the current time. Nothing here keeps state between calls; callers re-run
//! [`resolve`] whenever the snapshot changes or a countdown tick fires.

use chrono::{DateTime, Local};
use focuslock_api::{ConfigSnapshot, EnforcementState, FocusStatus, API_VERSION};

use crate::{active_schedule, remaining};

/// Derive the enforcement state.
///
/// Precedence: an unexpired pause, then an unexpired manual lock, then an
/// active schedule, else unlocked.
pub fn resolve(config: &ConfigSnapshot, now: DateTime<Local>) -> EnforcementState {
    if let Some(until) = active_pause(config, now) {
        return EnforcementState::Paused { until };
    }

    if let Some(end_time) = active_manual_lock(config, now) {
        return EnforcementState::LockedManual { end_time };
    }

    if let Some(active) = active_schedule(&config.schedules, &now) {
        return EnforcementState::LockedScheduled {
            end_time: active.end_time,
            schedule: active.schedule.reference(),
        };
    }

    EnforcementState::Unlocked
}

/// Whether a manual lock or schedule is running, pause or not.
///
/// A pause suspends enforcement without ending the session, so block-list
/// guards keep applying while paused.
pub fn session_in_force(config: &ConfigSnapshot, now: DateTime<Local>) -> bool {
    active_manual_lock(config, now).is_some() || active_schedule(&config.schedules, &now).is_some()
}

/// Manual lock expiry, if it is still in the future
pub fn active_manual_lock(config: &ConfigSnapshot, now: DateTime<Local>) -> Option<DateTime<Local>> {
    config.lock_end_time.filter(|end| now < *end)
}

/// Pause expiry, if it is still in the future
pub fn active_pause(config: &ConfigSnapshot, now: DateTime<Local>) -> Option<DateTime<Local>> {
    config.paused_until.filter(|until| now < *until)
}

/// Build the status view for a snapshot
pub fn evaluate(
    config: &ConfigSnapshot,
    now: DateTime<Local>,
    emergency_unlock_limit: u32,
) -> FocusStatus {
    let state = resolve(config, now);
    let remaining = state.end_time().map(|end| remaining(end, now));

    FocusStatus {
        api_version: API_VERSION,
        session_in_force: session_in_force(config, now),
        state,
        remaining,
        emergency_unlocks_used: config.emergency_unlocks_used,
        emergency_unlock_limit,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use focuslock_api::Schedule;
    use focuslock_util::{DayTag, WallClock};

    // 2025-12-29 is a Monday
    fn monday(h: u32, m: u32, s: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 12, 29, h, m, s).unwrap()
    }

    fn work_schedule() -> Schedule {
        Schedule::new(
            "Work",
            vec![DayTag::Mon],
            WallClock::new(9, 0).unwrap(),
            WallClock::new(17, 0).unwrap(),
        )
    }

    #[test]
    fn empty_config_is_unlocked() {
        let config = ConfigSnapshot::default();
        assert_eq!(resolve(&config, monday(12, 0, 0)), EnforcementState::Unlocked);
        assert!(!session_in_force(&config, monday(12, 0, 0)));
    }

    #[test]
    fn pause_always_wins() {
        let now = monday(10, 0, 0);
        let mut config = ConfigSnapshot::default();
        config.schedules.push(work_schedule());
        config.lock_end_time = Some(now + Duration::hours(1));
        config.paused_until = Some(now + Duration::minutes(2));

        assert_eq!(
            resolve(&config, now),
            EnforcementState::Paused {
                until: now + Duration::minutes(2)
            }
        );
        // Still in force underneath the pause
        assert!(session_in_force(&config, now));
    }

    #[test]
    fn manual_beats_scheduled() {
        let now = monday(10, 0, 0);
        let mut config = ConfigSnapshot::default();
        config.schedules.push(work_schedule());
        config.lock_end_time = Some(now + Duration::hours(8));

        assert_eq!(
            resolve(&config, now),
            EnforcementState::LockedManual {
                end_time: now + Duration::hours(8)
            }
        );
    }

    #[test]
    fn scheduled_lock_when_no_manual() {
        let now = monday(10, 0, 0);
        let mut config = ConfigSnapshot::default();
        let schedule = work_schedule();
        config.schedules.push(schedule.clone());

        match resolve(&config, now) {
            EnforcementState::LockedScheduled { end_time, schedule: r } => {
                assert_eq!(end_time, monday(17, 0, 0));
                assert_eq!(r, schedule.reference());
            }
            other => panic!("Expected LockedScheduled, got {:?}", other),
        }
    }

    #[test]
    fn expired_fields_are_inert() {
        let now = monday(20, 0, 0);
        let mut config = ConfigSnapshot::default();
        config.lock_end_time = Some(now - Duration::seconds(1));
        config.paused_until = Some(now - Duration::seconds(1));

        assert_eq!(resolve(&config, now), EnforcementState::Unlocked);
        assert!(!session_in_force(&config, now));

        // Exactly at expiry counts as expired
        config.lock_end_time = Some(now);
        assert_eq!(resolve(&config, now), EnforcementState::Unlocked);
    }

    #[test]
    fn expired_pause_falls_through_to_lock() {
        let now = monday(10, 0, 0);
        let mut config = ConfigSnapshot::default();
        config.lock_end_time = Some(now + Duration::minutes(30));
        config.paused_until = Some(now - Duration::seconds(5));

        assert!(matches!(
            resolve(&config, now),
            EnforcementState::LockedManual { .. }
        ));
    }

    #[test]
    fn resolve_is_idempotent() {
        let now = monday(10, 0, 0);
        let mut config = ConfigSnapshot::default();
        config.schedules.push(work_schedule());
        config.paused_until = Some(now + Duration::seconds(30));

        let first = resolve(&config, now);
        let second = resolve(&config, now);
        assert_eq!(first, second);
    }

    #[test]
    fn exactly_one_state_across_a_day() {
        let mut config = ConfigSnapshot::default();
        config.schedules.push(work_schedule());
        config.lock_end_time = Some(monday(18, 0, 0));
        config.paused_until = Some(monday(17, 30, 0));

        let mut now = monday(0, 0, 0);
        let end = monday(23, 59, 0);
        while now <= end {
            let expected = if now < monday(17, 30, 0) {
                "paused"
            } else if now < monday(18, 0, 0) {
                "manual"
            } else {
                "unlocked"
            };
            let actual = match resolve(&config, now) {
                EnforcementState::Paused { .. } => "paused",
                EnforcementState::LockedManual { .. } => "manual",
                EnforcementState::LockedScheduled { .. } => "scheduled",
                EnforcementState::Unlocked => "unlocked",
            };
            assert_eq!(actual, expected, "at {}", now);
            now += Duration::minutes(7);
        }
    }

    #[test]
    fn evaluate_reports_remaining() {
        let now = monday(10, 0, 0);
        let mut config = ConfigSnapshot::default();
        config.lock_end_time = Some(now + Duration::seconds(3725));
        config.emergency_unlocks_used = 1;

        let status = evaluate(&config, now, 2);
        let remaining = status.remaining.unwrap();
        assert_eq!(remaining.hours, 1);
        assert_eq!(remaining.minutes, 2);
        assert_eq!(remaining.seconds, 5);
        assert!(status.session_in_force);
        assert_eq!(status.emergency_unlocks_used, 1);
        assert_eq!(status.emergency_unlock_limit, 2);

        let unlocked = evaluate(&ConfigSnapshot::default(), now, 2);
        assert!(unlocked.remaining.is_none());
    }
}
