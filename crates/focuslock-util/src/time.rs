//! Time utilities for focuslock
//!
//! All focus-lock times are local wall-clock times: schedules are written as
//! `HH:MM` on named weekdays, and lock/pause expiries are absolute local
//! timestamps.
//!
//! # Mock Time for Development
//!
//! In debug builds, the `FOCUSLOCK_MOCK_TIME` environment variable overrides
//! the system time for every time-sensitive operation. This is how schedules
//! are exercised by hand without waiting for Monday morning.
//!
//! Format: `YYYY-MM-DD HH:MM:SS` (e.g., `2025-12-29 09:00:00`)
//!
//! ```bash
//! FOCUSLOCK_MOCK_TIME="2025-12-29 09:00:00" focuslockd
//! ```

use chrono::{DateTime, Datelike, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// Environment variable name for mock time (debug builds only)
pub const MOCK_TIME_ENV_VAR: &str = "FOCUSLOCK_MOCK_TIME";

const MOCK_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Offset between mock time and real time, captured at first use so that
/// mock time keeps advancing.
static MOCK_TIME_OFFSET: OnceLock<Option<chrono::Duration>> = OnceLock::new();

#[allow(clippy::disallowed_methods)] // wraps Local::now()
fn get_mock_time_offset() -> Option<chrono::Duration> {
    *MOCK_TIME_OFFSET.get_or_init(|| {
        #[cfg(debug_assertions)]
        {
            let mock_time_str = std::env::var(MOCK_TIME_ENV_VAR).ok()?;
            let Ok(naive_dt) = NaiveDateTime::parse_from_str(&mock_time_str, MOCK_TIME_FORMAT) else {
                tracing::warn!(
                    mock_time = %mock_time_str,
                    expected_format = MOCK_TIME_FORMAT,
                    "Invalid mock time format"
                );
                return None;
            };
            let Some(mock_dt) = Local.from_local_datetime(&naive_dt).earliest() else {
                tracing::warn!(mock_time = %mock_time_str, "Mock time does not exist in local timezone");
                return None;
            };
            let offset = mock_dt.signed_duration_since(chrono::Local::now());
            tracing::info!(
                mock_time = %mock_time_str,
                offset_secs = offset.num_seconds(),
                "Mock time enabled"
            );
            Some(offset)
        }
        #[cfg(not(debug_assertions))]
        {
            None
        }
    })
}

/// Returns whether mock time is currently active.
pub fn is_mock_time_active() -> bool {
    get_mock_time_offset().is_some()
}

/// Current local time, respecting `FOCUSLOCK_MOCK_TIME` in debug builds.
#[allow(clippy::disallowed_methods)] // the one sanctioned wrapper around Local::now()
pub fn now() -> DateTime<Local> {
    let real_now = chrono::Local::now();
    match get_mock_time_offset() {
        Some(offset) => real_now + offset,
        None => real_now,
    }
}

/// Format a timestamp as `HH:MM` for status lines.
pub fn format_clock_time(dt: &DateTime<Local>) -> String {
    dt.format("%H:%M").to_string()
}

/// Format a timestamp with full date and time.
pub fn format_datetime_full(dt: &DateTime<Local>) -> String {
    dt.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Combine a calendar date with a wall-clock time in the local timezone.
///
/// On a DST fold the earlier instant is used; a time that falls in a DST gap
/// yields `None`.
pub fn local_datetime(date: NaiveDate, time: WallClock) -> Option<DateTime<Local>> {
    Local
        .from_local_datetime(&date.and_time(time.to_naive_time()))
        .earliest()
}

/// Weekday tag as stored in schedules (`"Mon"` .. `"Sun"`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DayTag {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

impl DayTag {
    pub const ALL: [DayTag; 7] = [
        DayTag::Mon,
        DayTag::Tue,
        DayTag::Wed,
        DayTag::Thu,
        DayTag::Fri,
        DayTag::Sat,
        DayTag::Sun,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DayTag::Mon => "Mon",
            DayTag::Tue => "Tue",
            DayTag::Wed => "Wed",
            DayTag::Thu => "Thu",
            DayTag::Fri => "Fri",
            DayTag::Sat => "Sat",
            DayTag::Sun => "Sun",
        }
    }

    /// Tag for the weekday of a local timestamp
    pub fn of(dt: &DateTime<Local>) -> Self {
        dt.weekday().into()
    }

    fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

impl From<Weekday> for DayTag {
    fn from(weekday: Weekday) -> Self {
        match weekday {
            Weekday::Mon => DayTag::Mon,
            Weekday::Tue => DayTag::Tue,
            Weekday::Wed => DayTag::Wed,
            Weekday::Thu => DayTag::Thu,
            Weekday::Fri => DayTag::Fri,
            Weekday::Sat => DayTag::Sat,
            Weekday::Sun => DayTag::Sun,
        }
    }
}

impl fmt::Display for DayTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DayTag {
    type Err = String;

    /// Accepts short or long English names, case-insensitive
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mon" | "monday" => Ok(DayTag::Mon),
            "tue" | "tues" | "tuesday" => Ok(DayTag::Tue),
            "wed" | "wednesday" => Ok(DayTag::Wed),
            "thu" | "thur" | "thurs" | "thursday" => Ok(DayTag::Thu),
            "fri" | "friday" => Ok(DayTag::Fri),
            "sat" | "saturday" => Ok(DayTag::Sat),
            "sun" | "sunday" => Ok(DayTag::Sun),
            other => Err(format!("Unknown day: {}", other)),
        }
    }
}

/// Days of the week mask
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DaysOfWeek(u8);

impl DaysOfWeek {
    pub const WEEKDAYS: DaysOfWeek = DaysOfWeek(0x1F);
    pub const WEEKENDS: DaysOfWeek = DaysOfWeek(0x60);
    pub const ALL_DAYS: DaysOfWeek = DaysOfWeek(0x7F);
    pub const NONE: DaysOfWeek = DaysOfWeek(0);

    pub fn new(mask: u8) -> Self {
        Self(mask & 0x7F)
    }

    pub fn from_tags<'a>(tags: impl IntoIterator<Item = &'a DayTag>) -> Self {
        Self(tags.into_iter().fold(0, |mask, tag| mask | tag.bit()))
    }

    pub fn contains(&self, day: DayTag) -> bool {
        (self.0 & day.bit()) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Tags in calendar order, Monday first
    pub fn tags(&self) -> Vec<DayTag> {
        DayTag::ALL
            .into_iter()
            .filter(|day| self.contains(*day))
            .collect()
    }
}

impl std::ops::BitOr for DaysOfWeek {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

/// Wall-clock time of day with minute precision, serialized as `"HH:MM"`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WallClock {
    hour: u8,
    minute: u8,
}

impl WallClock {
    pub const MIDNIGHT: WallClock = WallClock { hour: 0, minute: 0 };

    pub fn new(hour: u8, minute: u8) -> Option<Self> {
        if hour < 24 && minute < 60 {
            Some(Self { hour, minute })
        } else {
            None
        }
    }

    /// Parse strict 24h `HH:MM`
    pub fn parse(s: &str) -> Result<Self, String> {
        let (h, m) = s
            .split_once(':')
            .ok_or_else(|| format!("Invalid time '{}': expected HH:MM", s))?;
        if h.len() != 2 || m.len() != 2 {
            return Err(format!("Invalid time '{}': expected HH:MM", s));
        }
        let hour: u8 = h
            .parse()
            .map_err(|_| format!("Invalid time '{}': bad hour", s))?;
        let minute: u8 = m
            .parse()
            .map_err(|_| format!("Invalid time '{}': bad minute", s))?;
        if hour >= 24 {
            return Err(format!("Invalid time '{}': hour must be 00-23", s));
        }
        if minute >= 60 {
            return Err(format!("Invalid time '{}': minute must be 00-59", s));
        }
        Ok(Self { hour, minute })
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn minute(&self) -> u8 {
        self.minute
    }

    pub fn to_naive_time(self) -> NaiveTime {
        NaiveTime::from_hms_opt(self.hour as u32, self.minute as u32, 0).unwrap_or(NaiveTime::MIN)
    }

    /// Seconds since midnight
    pub fn as_seconds_from_midnight(&self) -> u32 {
        (self.hour as u32) * 3600 + (self.minute as u32) * 60
    }
}

impl PartialOrd for WallClock {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for WallClock {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.as_seconds_from_midnight()
            .cmp(&other.as_seconds_from_midnight())
    }
}

impl fmt::Display for WallClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl FromStr for WallClock {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for WallClock {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<WallClock> for String {
    fn from(value: WallClock) -> Self {
        value.to_string()
    }
}

/// A same-day time window repeated on a set of weekdays
///
/// The window is half-open: `start` is inside, `end` is not. Windows whose
/// end is not after their start never match; overnight spans are not
/// supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub days: DaysOfWeek,
    pub start: WallClock,
    pub end: WallClock,
}

impl TimeWindow {
    pub fn new(days: DaysOfWeek, start: WallClock, end: WallClock) -> Self {
        Self { days, start, end }
    }

    /// Check if the given local datetime falls within this window.
    ///
    /// Compared at second precision, so 08:59:59 is outside a 09:00 start.
    pub fn contains(&self, dt: &DateTime<Local>) -> bool {
        if self.start >= self.end || !self.days.contains(DayTag::of(dt)) {
            return false;
        }

        let now_secs = dt.time().num_seconds_from_midnight();
        now_secs >= self.start.as_seconds_from_midnight()
            && now_secs < self.end.as_seconds_from_midnight()
    }

    /// End of the window on the same calendar day as `dt`
    pub fn end_on(&self, dt: &DateTime<Local>) -> Option<DateTime<Local>> {
        local_datetime(dt.date_naive(), self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wall_clock_ordering() {
        let morning = WallClock::new(8, 0).unwrap();
        let noon = WallClock::new(12, 0).unwrap();
        let evening = WallClock::new(18, 30).unwrap();

        assert!(morning < noon);
        assert!(noon < evening);
    }

    #[test]
    fn wall_clock_parse() {
        assert_eq!(WallClock::parse("09:05").unwrap(), WallClock::new(9, 5).unwrap());
        assert_eq!(WallClock::parse("00:00").unwrap(), WallClock::MIDNIGHT);
        assert_eq!(WallClock::parse("23:59").unwrap(), WallClock::new(23, 59).unwrap());

        assert!(WallClock::parse("24:00").is_err());
        assert!(WallClock::parse("12:60").is_err());
        assert!(WallClock::parse("9:00").is_err());
        assert!(WallClock::parse("0900").is_err());
        assert!(WallClock::parse("").is_err());
    }

    #[test]
    fn wall_clock_serde_as_string() {
        let t = WallClock::new(7, 30).unwrap();
        assert_eq!(serde_json::to_string(&t).unwrap(), "\"07:30\"");
        let parsed: WallClock = serde_json::from_str("\"17:00\"").unwrap();
        assert_eq!(parsed, WallClock::new(17, 0).unwrap());
        assert!(serde_json::from_str::<WallClock>("\"25:00\"").is_err());
    }

    #[test]
    fn day_tags() {
        assert_eq!("Mon".parse::<DayTag>().unwrap(), DayTag::Mon);
        assert_eq!("thursday".parse::<DayTag>().unwrap(), DayTag::Thu);
        assert!("Funday".parse::<DayTag>().is_err());
        assert_eq!(serde_json::to_string(&DayTag::Sat).unwrap(), "\"Sat\"");
    }

    #[test]
    fn days_of_week_from_tags() {
        let days = DaysOfWeek::from_tags(&[DayTag::Mon, DayTag::Wed]);
        assert!(days.contains(DayTag::Mon));
        assert!(!days.contains(DayTag::Tue));
        assert_eq!(days.tags(), vec![DayTag::Mon, DayTag::Wed]);

        assert!(DaysOfWeek::WEEKDAYS.contains(DayTag::Fri));
        assert!(!DaysOfWeek::WEEKDAYS.contains(DayTag::Sat));
        assert!(DaysOfWeek::WEEKENDS.contains(DayTag::Sun));
        assert!(DaysOfWeek::from_tags(&[]).is_empty());
    }

    #[test]
    fn time_window_half_open() {
        let window = TimeWindow::new(
            DaysOfWeek::from_tags(&[DayTag::Mon]),
            WallClock::new(9, 0).unwrap(),
            WallClock::new(17, 0).unwrap(),
        );

        // 2025-12-29 is a Monday
        let at = |h, m, s| Local.with_ymd_and_hms(2025, 12, 29, h, m, s).unwrap();
        assert!(window.contains(&at(9, 0, 0)));
        assert!(window.contains(&at(16, 59, 59)));
        assert!(!window.contains(&at(17, 0, 0)));
        assert!(!window.contains(&at(8, 59, 59)));

        // Tuesday
        let tue = Local.with_ymd_and_hms(2025, 12, 30, 10, 0, 0).unwrap();
        assert!(!window.contains(&tue));
    }

    #[test]
    fn inverted_window_never_matches() {
        let window = TimeWindow::new(
            DaysOfWeek::ALL_DAYS,
            WallClock::new(22, 0).unwrap(),
            WallClock::new(2, 0).unwrap(),
        );
        let late = Local.with_ymd_and_hms(2025, 12, 29, 23, 0, 0).unwrap();
        assert!(!window.contains(&late));
    }

    #[test]
    fn window_end_on_same_day() {
        let window = TimeWindow::new(
            DaysOfWeek::ALL_DAYS,
            WallClock::new(9, 0).unwrap(),
            WallClock::new(17, 0).unwrap(),
        );
        let dt = Local.with_ymd_and_hms(2025, 12, 29, 10, 15, 0).unwrap();
        let end = window.end_on(&dt).unwrap();
        assert_eq!(end, Local.with_ymd_and_hms(2025, 12, 29, 17, 0, 0).unwrap());
    }

    #[test]
    fn clock_formatting() {
        let dt = Local.with_ymd_and_hms(2025, 12, 25, 14, 30, 45).unwrap();
        assert_eq!(format_clock_time(&dt), "14:30");
        assert_eq!(format_datetime_full(&dt), "2025-12-25 14:30:45");
    }

    #[test]
    fn mock_time_format_parses() {
        assert!(NaiveDateTime::parse_from_str("2025-12-29 09:00:00", MOCK_TIME_FORMAT).is_ok());
        assert!(NaiveDateTime::parse_from_str("2025-12-29T09:00:00", MOCK_TIME_FORMAT).is_err());
    }

    #[test]
    fn now_advances() {
        let t1 = now();
        std::thread::sleep(std::time::Duration::from_millis(20));
        let t2 = now();
        assert!(t2 > t1);
        assert!(t1.year() >= 2020);
    }
}
