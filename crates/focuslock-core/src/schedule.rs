//! Weekly schedule matching

use chrono::{DateTime, Local, Timelike};
use focuslock_api::Schedule;

/// A schedule that is in effect right now
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveSchedule<'a> {
    pub schedule: &'a Schedule,
    /// Today's date combined with the schedule's end time
    pub end_time: DateTime<Local>,
}

/// Find the schedule in effect at `now`, if any.
///
/// Only enabled schedules whose days include today and whose half-open
/// `[start_time, end_time)` range contains the current time match. When
/// several match, the one ending first wins, then the one starting first,
/// then the smallest id; list order never matters.
pub fn active_schedule<'a>(
    schedules: &'a [Schedule],
    now: &DateTime<Local>,
) -> Option<ActiveSchedule<'a>> {
    schedules
        .iter()
        .filter(|s| s.enabled && s.window().contains(now))
        .min_by(|a, b| {
            a.end_time
                .cmp(&b.end_time)
                .then(a.start_time.cmp(&b.start_time))
                .then_with(|| a.id.cmp(&b.id))
        })
        .map(|schedule| ActiveSchedule {
            schedule,
            end_time: implied_end(schedule, now),
        })
}

/// End of a matching schedule's window, on the same day as `now`.
fn implied_end(schedule: &Schedule, now: &DateTime<Local>) -> DateTime<Local> {
    schedule.window().end_on(now).unwrap_or_else(|| {
        // End time falls in a DST gap; count forward from now instead
        let now_secs = now.time().num_seconds_from_midnight() as i64;
        let end_secs = schedule.end_time.as_seconds_from_midnight() as i64;
        *now + chrono::Duration::seconds((end_secs - now_secs).max(0))
    })
}
