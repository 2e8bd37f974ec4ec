//! Derived one-hour meeting slot.

use chrono::{NaiveDate, NaiveTime, TimeDelta};
use serde::{Deserialize, Serialize};

/// Fixed slot length in minutes. Not configurable.
pub const SLOT_MINUTES: i64 = 60;

/// Fixed slot length as a duration.
pub fn slot_length() -> TimeDelta {
    TimeDelta::minutes(SLOT_MINUTES)
}

/// Candidate meeting interval `[start, end)` on `date`.
///
/// Computed on demand; has no lifecycle of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Slot {
    pub date: NaiveDate,
    pub start: NaiveTime,
    /// Always `start + 1h`.
    pub end: NaiveTime,
}

impl Slot {
    /// Builds the slot starting at `start`, or `None` when it would run past midnight.
    pub fn starting_at(date: NaiveDate, start: NaiveTime) -> Option<Self> {
        let (end, wrapped_secs) = start.overflowing_add_signed(slot_length());
        if wrapped_secs != 0 {
            return None;
        }
        Some(Self { date, start, end })
    }
}
