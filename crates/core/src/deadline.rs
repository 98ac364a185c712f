//! Deadline calculator.
//!
//! Pure and deterministic: the clock is always passed in, never read.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::{Date, Duration, OffsetDateTime, Weekday};

/// Largest day count a catalog may declare for a response deadline.
pub const MAX_DEADLINE_DAYS: u32 = 36_500;

/// How a deadline's day count is measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeadlineUnit {
    Calendar,
    Business,
}

impl fmt::Display for DeadlineUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeadlineUnit::Calendar => f.write_str("calendar"),
            DeadlineUnit::Business => f.write_str("business"),
        }
    }
}

impl FromStr for DeadlineUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "calendar" => Ok(DeadlineUnit::Calendar),
            "business" => Ok(DeadlineUnit::Business),
            other => Err(format!(
                "unknown deadline unit '{}': expected 'calendar' or 'business'",
                other
            )),
        }
    }
}

/// Monday through Friday. Weekday is taken in the instant's own offset.
pub fn is_business_day(instant: OffsetDateTime) -> bool {
    !matches!(instant.weekday(), Weekday::Saturday | Weekday::Sunday)
}

/// The instant a response is due, `count` days of `unit` after `start`.
///
/// Business days are counted by stepping one calendar day at a time and
/// counting only weekdays, so the result never falls on a weekend (unless
/// `count` is zero, which returns `start` unchanged). The time of day is
/// preserved. A result past the last representable date saturates to that
/// date.
pub fn compute_deadline(start: OffsetDateTime, count: u32, unit: DeadlineUnit) -> OffsetDateTime {
    match unit {
        DeadlineUnit::Calendar => start
            .checked_add(Duration::days(i64::from(count)))
            .unwrap_or_else(|| latest(start)),
        DeadlineUnit::Business => {
            let mut cursor = start;
            let mut counted = 0;
            while counted < count {
                cursor = match cursor.checked_add(Duration::days(1)) {
                    Some(next) => next,
                    None => return latest(start),
                };
                if is_business_day(cursor) {
                    counted += 1;
                }
            }
            cursor
        }
    }
}

fn latest(start: OffsetDateTime) -> OffsetDateTime {
    Date::MAX.with_time(start.time()).assume_offset(start.offset())
}
