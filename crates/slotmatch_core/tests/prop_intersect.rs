//! Property tests for the slot intersection engine.

use chrono::{NaiveDate, NaiveTime, TimeDelta};
use proptest::prelude::*;
use slotmatch_core::{intersect, AvailabilityWindow, Slot};

fn arb_window(owner: i64) -> impl Strategy<Value = AvailabilityWindow> {
    (1u32..=5, 0u32..(24 * 60 - 1))
        .prop_flat_map(move |(day, start_min)| {
            ((start_min + 1)..=(24 * 60 - 1)).prop_map(move |end_min| (day, start_min, end_min))
        })
        .prop_map(move |(day, start_min, end_min)| {
            AvailabilityWindow::new(
                owner,
                NaiveDate::from_ymd_opt(2025, 1, day).unwrap(),
                NaiveTime::from_hms_opt(start_min / 60, start_min % 60, 0).unwrap(),
                NaiveTime::from_hms_opt(end_min / 60, end_min % 60, 0).unwrap(),
            )
        })
}

fn sorted(mut slots: Vec<Slot>) -> Vec<Slot> {
    slots.sort();
    slots
}

proptest! {
    #[test]
    fn swapping_inputs_yields_same_multiset(
        candidate in prop::collection::vec(arb_window(1), 1..6),
        interviewer in prop::collection::vec(arb_window(2), 1..6),
    ) {
        let forward = intersect(&candidate, &interviewer).unwrap();
        let backward = intersect(&interviewer, &candidate).unwrap();
        prop_assert_eq!(sorted(forward), sorted(backward));
    }

    #[test]
    fn every_slot_is_one_hour_inside_a_matching_overlap(
        candidate in prop::collection::vec(arb_window(1), 1..6),
        interviewer in prop::collection::vec(arb_window(2), 1..6),
    ) {
        let slots = intersect(&candidate, &interviewer).unwrap();
        for slot in &slots {
            prop_assert_eq!(slot.end - slot.start, TimeDelta::hours(1));
            let covered = candidate.iter().any(|c| {
                interviewer.iter().any(|i| {
                    c.date == slot.date
                        && i.date == slot.date
                        && slot.start >= c.start.max(i.start)
                        && slot.end <= c.end.min(i.end)
                })
            });
            prop_assert!(covered, "slot {:?} has no matching window pair", slot);
        }
    }

    #[test]
    fn single_pair_tiles_floor_of_overlap_hours(
        c in arb_window(1),
        i in arb_window(2),
    ) {
        let slots = intersect(&[c], &[i]).unwrap();
        let expected = if c.date == i.date && c.end.min(i.end) > c.start.max(i.start) {
            (c.end.min(i.end) - c.start.max(i.start)).num_minutes() / 60
        } else {
            0
        };
        prop_assert_eq!(slots.len() as i64, expected);
    }
}
