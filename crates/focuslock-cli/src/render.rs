//! Human-readable output

use chrono::{DateTime, Local};
use focuslock_api::{ConfigSnapshot, EffectiveBlocklist, EnforcementState, FocusStatus, Schedule};
use focuslock_core::SessionDuration;
use focuslock_util::format_clock_time;
use std::fmt::Write;

/// One-line summary of the enforcement state
pub fn describe_status(status: &FocusStatus) -> String {
    let left = status
        .remaining
        .map(|r| format!(", {} left", r.humanize()))
        .unwrap_or_default();

    match &status.state {
        EnforcementState::Unlocked => "Unlocked".to_string(),
        EnforcementState::LockedManual { end_time } => {
            format!("Locked until {}{}", format_clock_time(end_time), left)
        }
        EnforcementState::LockedScheduled { end_time, schedule } => format!(
            "Locked by schedule \"{}\" until {}{}",
            schedule.name,
            format_clock_time(end_time),
            left
        ),
        EnforcementState::Paused { until } => format!(
            "Paused until {}{} (emergency unlocks used: {}/{})",
            format_clock_time(until),
            left,
            status.emergency_unlocks_used,
            status.emergency_unlock_limit
        ),
    }
}

/// Countdown line for `watch`
pub fn countdown_line(status: &FocusStatus) -> String {
    let label = match status.state {
        EnforcementState::Unlocked => "UNLOCKED",
        EnforcementState::LockedManual { .. } => "LOCKED",
        EnforcementState::LockedScheduled { .. } => "SCHEDULED",
        EnforcementState::Paused { .. } => "PAUSED",
    };
    match status.remaining {
        Some(remaining) => format!("{:<9} {}", label, remaining.clock()),
        None => label.to_string(),
    }
}

pub fn format_schedule(schedule: &Schedule) -> String {
    let days = schedule
        .days
        .iter()
        .map(|d| d.as_str())
        .collect::<Vec<_>>()
        .join(",");
    format!(
        "[{}] {:<20} {:<27} {}-{}  ({})",
        if schedule.enabled { "on " } else { "off" },
        schedule.name,
        days,
        schedule.start_time,
        schedule.end_time,
        schedule.id
    )
}

/// Text shown before a session is confirmed
pub fn confirmation_text(
    duration: SessionDuration,
    config: &ConfigSnapshot,
    blocklist: &EffectiveBlocklist,
    now: DateTime<Local>,
) -> String {
    let end = now + chrono::Duration::seconds(duration.total_seconds() as i64);
    let mut out = String::new();

    let _ = writeln!(out, "Start a {} focus session (until about {})?", duration, format_clock_time(&end));
    let _ = writeln!(out);

    let _ = writeln!(out, "Blocked apps:");
    if config.blocked_apps.is_empty() {
        let _ = writeln!(out, "  (none)");
    }
    for app in &config.blocked_apps {
        let _ = writeln!(out, "  {}", app);
    }

    let _ = writeln!(out, "Blocked sites:");
    if config.blocked_sites.is_empty() {
        let _ = writeln!(out, "  (none)");
    }
    for site in &config.blocked_sites {
        let _ = writeln!(out, "  {}", site);
    }

    if config.block_common_vpn {
        let extra = blocklist.apps.len().saturating_sub(config.blocked_apps.len());
        let _ = writeln!(out, "Common VPN clients are blocked too ({} extra apps).", extra);
    }

    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "WARNING: once started, the session cannot be cancelled and nothing can be \
         removed from the block lists until it ends."
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use focuslock_api::{Remaining, ScheduleRef, API_VERSION};
    use focuslock_util::{DayTag, ScheduleId, WallClock};

    fn status(state: EnforcementState, remaining: Option<u64>) -> FocusStatus {
        FocusStatus {
            api_version: API_VERSION,
            state,
            remaining: remaining.map(Remaining::from_seconds),
            session_in_force: true,
            emergency_unlocks_used: 1,
            emergency_unlock_limit: 2,
        }
    }

    fn at(h: u32, m: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 12, 29, h, m, 0).unwrap()
    }

    #[test]
    fn status_descriptions() {
        assert_eq!(describe_status(&status(EnforcementState::Unlocked, None)), "Unlocked");

        let manual = status(EnforcementState::LockedManual { end_time: at(17, 30) }, Some(3900));
        assert_eq!(describe_status(&manual), "Locked until 17:30, 1 hr 5 min left");

        let scheduled = status(
            EnforcementState::LockedScheduled {
                end_time: at(17, 0),
                schedule: ScheduleRef {
                    id: ScheduleId::new("w"),
                    name: "Work".into(),
                },
            },
            Some(30),
        );
        assert_eq!(
            describe_status(&scheduled),
            "Locked by schedule \"Work\" until 17:00, 1 min left"
        );

        let paused = status(EnforcementState::Paused { until: at(10, 2) }, Some(90));
        assert!(describe_status(&paused).ends_with("(emergency unlocks used: 1/2)"));
    }

    #[test]
    fn countdown_uses_clock_form() {
        let manual = status(EnforcementState::LockedManual { end_time: at(17, 30) }, Some(3909));
        assert_eq!(countdown_line(&manual), "LOCKED    01:05:09");
        assert_eq!(countdown_line(&status(EnforcementState::Unlocked, None)), "UNLOCKED");
    }

    #[test]
    fn confirmation_lists_everything() {
        let mut config = ConfigSnapshot::default();
        config.blocked_apps = vec!["steam.exe".into()];
        let blocklist = focuslock_core::effective_blocklist(&config);

        let text = confirmation_text(SessionDuration::new(1, 30).unwrap(), &config, &blocklist, at(9, 0));
        assert!(text.contains("1 hr 30 min"));
        assert!(text.contains("until about 10:30"));
        assert!(text.contains("  steam.exe"));
        assert!(text.contains("(none)"));
        assert!(text.contains("cannot be cancelled"));
        assert!(text.contains("Common VPN clients"));
    }

    #[test]
    fn schedule_line() {
        let schedule = Schedule {
            id: ScheduleId::new("abc"),
            name: "Work".into(),
            days: vec![DayTag::Mon, DayTag::Fri],
            start_time: WallClock::new(9, 0).unwrap(),
            end_time: WallClock::new(17, 0).unwrap(),
            enabled: false,
        };
        let line = format_schedule(&schedule);
        assert!(line.starts_with("[off] Work"));
        assert!(line.contains("Mon,Fri"));
        assert!(line.contains("09:00-17:00"));
        assert!(line.ends_with("(abc)"));
    }
}
