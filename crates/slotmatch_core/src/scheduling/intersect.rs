//! Slot intersection engine.
//!
//! # Responsibility
//! - Compute the overlap of every same-date (candidate, interviewer) window
//!   pair and tile it into consecutive one-hour slots.
//!
//! # Invariants
//! - Empty input on either side is `NoAvailabilityData`; zero overlap is a
//!   successful empty result.
//! - Pairs are visited candidate-major; tiles within a pair are chronological.
//! - A trailing partial hour is discarded.
//! - Slots are not deduplicated across pairs. One window per `(owner, date)`
//!   in storage keeps pairs from overlapping.

use crate::model::availability::AvailabilityWindow;
use crate::model::slot::Slot;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Which party lacks registered availability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingSide {
    Candidate,
    Interviewer,
    Both,
}

impl MissingSide {
    fn label(self) -> &'static str {
        match self {
            Self::Candidate => "candidate",
            Self::Interviewer => "interviewer",
            Self::Both => "candidate and interviewer",
        }
    }
}

/// Engine failure kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotError {
    /// One or both parties have never registered a window.
    NoAvailabilityData { side: MissingSide },
}

impl Display for SlotError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoAvailabilityData { side } => write!(
                f,
                "no availability data found for the given {}",
                side.label()
            ),
        }
    }
}

impl Error for SlotError {}

pub type SlotResult<T> = Result<T, SlotError>;

/// Computes common one-hour slots for two window collections.
///
/// # Errors
/// - `NoAvailabilityData` when either collection is empty.
pub fn intersect(
    candidate: &[AvailabilityWindow],
    interviewer: &[AvailabilityWindow],
) -> SlotResult<Vec<Slot>> {
    let side = match (candidate.is_empty(), interviewer.is_empty()) {
        (true, true) => Some(MissingSide::Both),
        (true, false) => Some(MissingSide::Candidate),
        (false, true) => Some(MissingSide::Interviewer),
        (false, false) => None,
    };
    if let Some(side) = side {
        return Err(SlotError::NoAvailabilityData { side });
    }

    let mut slots = Vec::new();
    for c in candidate {
        for i in interviewer {
            if c.date == i.date {
                tile_overlap(c, i, &mut slots);
            }
        }
    }
    Ok(slots)
}

/// Appends the one-hour tiles of the overlap between two same-date windows.
fn tile_overlap(a: &AvailabilityWindow, b: &AvailabilityWindow, out: &mut Vec<Slot>) {
    let overlap_start = a.start.max(b.start);
    let overlap_end = a.end.min(b.end);
    if overlap_end <= overlap_start {
        return;
    }

    let mut cursor = overlap_start;
    while let Some(slot) = Slot::starting_at(a.date, cursor) {
        if slot.end > overlap_end {
            break;
        }
        out.push(slot);
        cursor = slot.end;
    }
}

#[cfg(test)]
mod tests {
    use super::{intersect, MissingSide, SlotError};
    use crate::model::availability::AvailabilityWindow;
    use chrono::{NaiveDate, NaiveTime};

    fn window(owner: i64, day: u32, start: (u32, u32), end: (u32, u32)) -> AvailabilityWindow {
        AvailabilityWindow::new(
            owner,
            NaiveDate::from_ymd_opt(2025, 1, day).unwrap(),
            NaiveTime::from_hms_opt(start.0, start.1, 0).unwrap(),
            NaiveTime::from_hms_opt(end.0, end.1, 0).unwrap(),
        )
    }

    fn hm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn reports_which_side_is_missing() {
        let w = [window(1, 12, (10, 0), (11, 0))];
        assert_eq!(
            intersect(&[], &w).unwrap_err(),
            SlotError::NoAvailabilityData {
                side: MissingSide::Candidate
            }
        );
        assert_eq!(
            intersect(&w, &[]).unwrap_err(),
            SlotError::NoAvailabilityData {
                side: MissingSide::Interviewer
            }
        );
        assert_eq!(
            intersect(&[], &[]).unwrap_err(),
            SlotError::NoAvailabilityData {
                side: MissingSide::Both
            }
        );
    }

    #[test]
    fn discards_trailing_partial_hour() {
        let c = [window(1, 12, (9, 15), (12, 0))];
        let i = [window(2, 12, (9, 0), (17, 0))];
        let slots = intersect(&c, &i).unwrap();
        let starts: Vec<_> = slots.iter().map(|slot| slot.start).collect();
        assert_eq!(starts, vec![hm(9, 15), hm(10, 15)]);
        assert_eq!(slots[1].end, hm(11, 15));
    }

    #[test]
    fn touching_windows_produce_no_slots() {
        let c = [window(1, 12, (9, 0), (11, 0))];
        let i = [window(2, 12, (11, 0), (13, 0))];
        assert!(intersect(&c, &i).unwrap().is_empty());
    }

    #[test]
    fn overlap_shorter_than_an_hour_produces_no_slots() {
        let c = [window(1, 12, (9, 0), (10, 30))];
        let i = [window(2, 12, (10, 0), (13, 0))];
        assert!(intersect(&c, &i).unwrap().is_empty());
    }

    #[test]
    fn late_evening_overlap_stops_before_midnight() {
        let c = [window(1, 12, (21, 0), (23, 59))];
        let i = [window(2, 12, (20, 0), (23, 59))];
        let slots = intersect(&c, &i).unwrap();
        assert_eq!(slots.len(), 2);
        assert_eq!(slots[1].end, hm(23, 0));
    }
}
