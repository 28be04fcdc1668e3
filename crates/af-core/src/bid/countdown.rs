use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Time left until an auction closes, split for display.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Countdown {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

impl Countdown {
    /// `None` once `end` has been reached.
    pub fn until(end: DateTime<Utc>, now: DateTime<Utc>) -> Option<Self> {
        let total = (end - now).num_seconds();
        if total <= 0 {
            return None;
        }
        Some(Self {
            days: total / 86_400,
            hours: (total % 86_400) / 3_600,
            minutes: (total % 3_600) / 60,
            seconds: total % 60,
        })
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }
}

impl std::fmt::Display for Countdown {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:02}d:{:02}h:{:02}m:{:02}s",
            self.days, self.hours, self.minutes, self.seconds
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn splits_remaining_time() {
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let end = now + Duration::seconds(2 * 86_400 + 3 * 3_600 + 4 * 60 + 5);
        let countdown = Countdown::until(end, now).unwrap();
        assert_eq!(countdown.to_string(), "02d:03h:04m:05s");
    }

    #[test]
    fn past_end_has_no_countdown() {
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        assert!(Countdown::until(now, now).is_none());
        assert!(Countdown::until(now - Duration::seconds(1), now).is_none());
    }
}
