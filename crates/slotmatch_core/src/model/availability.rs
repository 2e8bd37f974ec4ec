//! Availability window domain model.
//!
//! # Responsibility
//! - Define the per-user, per-date availability record.
//! - Provide the explicit validation function used before every write.
//!
//! # Invariants
//! - `end > start` (strict) for every stored window.
//! - `date >= today` at creation/update time only. Reads never re-check it.
//! - At most one window exists per `(owner, date)`.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Stable identifier of a user account (SQLite row id).
pub type UserId = i64;

/// One contiguous time-of-day interval on one date.
///
/// Times are wall-clock and timezone-naive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AvailabilityWindow {
    /// Account that declared this window.
    pub owner: UserId,
    pub date: NaiveDate,
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl AvailabilityWindow {
    pub fn new(owner: UserId, date: NaiveDate, start: NaiveTime, end: NaiveTime) -> Self {
        Self {
            owner,
            date,
            start,
            end,
        }
    }

    /// Validates the persisted shape of this window.
    ///
    /// Only the ordering rule applies here; the past-date rule is a write-time
    /// concern handled by [`validate_window`].
    pub fn validate(&self) -> Result<(), WindowValidationError> {
        check_time_order(self.start, self.end)
    }
}

/// Field-level rejection reasons for a candidate window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowValidationError {
    /// `date` is strictly before the current date.
    DateInPast { date: NaiveDate, today: NaiveDate },
    /// `end` is equal to or earlier than `start`.
    EndNotAfterStart { start: NaiveTime, end: NaiveTime },
}

impl WindowValidationError {
    /// Name of the request field the violation is attributed to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::DateInPast { .. } => "date",
            Self::EndNotAfterStart { .. } => "end_time",
        }
    }
}

impl Display for WindowValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DateInPast { date, today } => {
                write!(f, "the date cannot be in the past: {date} < {today}")
            }
            Self::EndNotAfterStart { start, end } => {
                write!(f, "end time must be after start time: {start} >= {end}")
            }
        }
    }
}

impl Error for WindowValidationError {}

/// Validates a candidate window against write-time rules.
///
/// The date rule is checked before the ordering rule, so a window violating
/// both reports `DateInPast`.
///
/// # Errors
/// - `DateInPast` when `date < today`.
/// - `EndNotAfterStart` when `end <= start`.
pub fn validate_window(
    date: NaiveDate,
    start: NaiveTime,
    end: NaiveTime,
    today: NaiveDate,
) -> Result<(), WindowValidationError> {
    if date < today {
        return Err(WindowValidationError::DateInPast { date, today });
    }
    check_time_order(start, end)
}

fn check_time_order(start: NaiveTime, end: NaiveTime) -> Result<(), WindowValidationError> {
    if end <= start {
        return Err(WindowValidationError::EndNotAfterStart { start, end });
    }
    Ok(())
}
