//! Session countdown

use chrono::{DateTime, Local};
use focuslock_api::Remaining;

/// Time left until `end`, clamped at zero.
///
/// All-zero means the state has run out; the next resolve pass moves on.
pub fn remaining(end: DateTime<Local>, now: DateTime<Local>) -> Remaining {
    let total = end.signed_duration_since(now).num_seconds().max(0) as u64;
    Remaining::from_seconds(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn splits_into_units() {
        let now = focuslock_util::now();
        let r = remaining(now + Duration::seconds(2 * 3600 + 15 * 60 + 9), now);
        assert_eq!(r.hours, 2);
        assert_eq!(r.minutes, 15);
        assert_eq!(r.seconds, 9);
        assert_eq!(r.total_seconds, 8109);
    }

    #[test]
    fn clamps_to_zero() {
        let now = focuslock_util::now();
        let r = remaining(now - Duration::seconds(10), now);
        assert!(r.is_zero());
        assert_eq!(r, Remaining::default());

        assert!(remaining(now, now).is_zero());
    }

    #[test]
    fn final_minute_displays_as_one() {
        let now = focuslock_util::now();
        let r = remaining(now + Duration::seconds(30), now);
        assert_eq!(r.minutes, 0);
        assert_eq!(r.display_minutes(), 1);
    }
}
