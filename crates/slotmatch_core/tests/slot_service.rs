use chrono::{NaiveDate, NaiveTime};
use rusqlite::Connection;
use slotmatch_core::db::open_db_in_memory;
use slotmatch_core::{
    AccessError, AvailabilityService, Caller, FixedClock, MissingSide, SlotError, SlotService,
    SlotServiceError, SqliteAvailabilityRepository, SqliteUserRepository, UserRepository,
};

fn date(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, d).unwrap()
}

fn hm(h: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, 0, 0).unwrap()
}

struct Fixture {
    candidate: Caller,
    interviewer: Caller,
    admin: Caller,
}

fn fixture(conn: &Connection) -> Fixture {
    let users = SqliteUserRepository::try_new(conn).unwrap();
    Fixture {
        candidate: Caller::regular(users.create_user("candidate", "pw", false).unwrap().id),
        interviewer: Caller::regular(users.create_user("interviewer", "pw", false).unwrap().id),
        admin: Caller::privileged(users.create_user("admin", "pw", true).unwrap().id),
    }
}

fn register(conn: &Connection, caller: &Caller, day: u32, start: u32, end: u32) {
    let repo = SqliteAvailabilityRepository::try_new(conn).unwrap();
    AvailabilityService::with_clock(repo, FixedClock(date(1)))
        .register(caller, date(day), hm(start), hm(end))
        .unwrap();
}

fn slots(conn: &Connection) -> SlotService<SqliteAvailabilityRepository<'_>> {
    SlotService::new(SqliteAvailabilityRepository::try_new(conn).unwrap())
}

#[test]
fn admin_gets_common_slots() {
    let conn = open_db_in_memory().unwrap();
    let f = fixture(&conn);
    register(&conn, &f.candidate, 12, 10, 13);
    register(&conn, &f.interviewer, 12, 11, 14);

    let result = slots(&conn)
        .interview_slots(&f.admin, f.candidate.user_id, f.interviewer.user_id)
        .unwrap();
    let starts: Vec<_> = result.iter().map(|slot| slot.start).collect();
    assert_eq!(starts, vec![hm(11), hm(12)]);
}

#[test]
fn regular_user_is_forbidden_even_for_own_slots() {
    let conn = open_db_in_memory().unwrap();
    let f = fixture(&conn);
    register(&conn, &f.candidate, 12, 10, 13);
    register(&conn, &f.interviewer, 12, 11, 14);

    let err = slots(&conn)
        .interview_slots(&f.candidate, f.candidate.user_id, f.interviewer.user_id)
        .unwrap_err();
    assert!(matches!(
        err,
        SlotServiceError::Access(AccessError::Forbidden { .. })
    ));
}

#[test]
fn missing_registrations_are_no_availability_data() {
    let conn = open_db_in_memory().unwrap();
    let f = fixture(&conn);
    register(&conn, &f.candidate, 12, 10, 13);

    let err = slots(&conn)
        .interview_slots(&f.admin, f.candidate.user_id, f.interviewer.user_id)
        .unwrap_err();
    assert!(matches!(
        err,
        SlotServiceError::Slots(SlotError::NoAvailabilityData {
            side: MissingSide::Interviewer
        })
    ));
}

#[test]
fn no_overlap_is_an_empty_success() {
    let conn = open_db_in_memory().unwrap();
    let f = fixture(&conn);
    register(&conn, &f.candidate, 12, 8, 10);
    register(&conn, &f.interviewer, 12, 10, 12);
    register(&conn, &f.interviewer, 13, 8, 10);

    let result = slots(&conn)
        .interview_slots(&f.admin, f.candidate.user_id, f.interviewer.user_id)
        .unwrap();
    assert!(result.is_empty());
}

#[test]
fn updated_window_is_used_for_slots() {
    let conn = open_db_in_memory().unwrap();
    let f = fixture(&conn);
    register(&conn, &f.candidate, 12, 8, 9);
    register(&conn, &f.candidate, 12, 9, 12);
    register(&conn, &f.interviewer, 12, 9, 12);

    let result = slots(&conn)
        .interview_slots(&f.admin, f.candidate.user_id, f.interviewer.user_id)
        .unwrap();
    assert_eq!(result.len(), 3);
}
