use chrono::{Datelike, NaiveDate, NaiveDateTime, TimeDelta};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeLeft {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

/// A fixed target moment on the local clock. The client clock is
/// authoritative; there is no server time to reconcile against.
pub struct Countdown {
    target: NaiveDateTime,
}

impl Countdown {
    // Jan 1 00:00:00 of the year after `now`.
    pub fn until_new_year(now: NaiveDateTime) -> Self {
        let target = NaiveDate::from_ymd_opt(now.year() + 1, 1, 1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .unwrap_or(now); // chrono's year range ends long before this matters
        Self { target }
    }

    pub fn at(target: NaiveDateTime) -> Self {
        Self { target }
    }

    // Demo mode: expire a fixed number of seconds from now.
    pub fn after_seconds(now: NaiveDateTime, secs: u32) -> Self {
        Self {
            target: now + TimeDelta::seconds(i64::from(secs)),
        }
    }

    pub fn target(&self) -> NaiveDateTime {
        self.target
    }

    /// Whole clock units left before the target, floored; None once
    /// the target has been reached.
    pub fn remaining(&self, now: NaiveDateTime) -> Option<TimeLeft> {
        let diff = self.target.signed_duration_since(now);
        if diff <= TimeDelta::zero() {
            return None;
        }
        let total = diff.num_seconds();
        Some(TimeLeft {
            days: total / 86_400,
            hours: total / 3_600 % 24,
            minutes: total / 60 % 60,
            seconds: total % 60,
        })
    }
}
