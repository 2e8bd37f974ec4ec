use slotmatch_core::db::migrations::latest_version;
use slotmatch_core::db::{open_db, open_db_in_memory, DbError};
use slotmatch_core::{RepoError, SqliteAvailabilityRepository};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "users");
    assert_table_exists(&conn, "auth_tokens");
    assert_table_exists(&conn, "availability");
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("slotmatch.db");

    let conn_first = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_first), latest_version());
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    assert_table_exists(&conn_second, "availability");
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn repository_rejects_unmigrated_connection() {
    let conn = Connection::open_in_memory().unwrap();
    let err = SqliteAvailabilityRepository::try_new(&conn).err().unwrap();
    assert!(matches!(
        err,
        RepoError::UninitializedConnection {
            actual_version: 0,
            ..
        }
    ));
}

#[test]
fn availability_table_enforces_one_row_per_owner_and_date() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO users (username, password_digest, password_salt) VALUES ('u', 'd', 's');",
        [],
    )
    .unwrap();
    let owner = conn.last_insert_rowid();

    conn.execute(
        "INSERT INTO availability (owner_id, date, start_time, end_time)
         VALUES (?1, '2025-01-12', '10:00:00', '13:00:00');",
        [owner],
    )
    .unwrap();
    let duplicate = conn.execute(
        "INSERT INTO availability (owner_id, date, start_time, end_time)
         VALUES (?1, '2025-01-12', '11:00:00', '12:00:00');",
        [owner],
    );
    assert!(duplicate.is_err());

    let reversed = conn.execute(
        "INSERT INTO availability (owner_id, date, start_time, end_time)
         VALUES (?1, '2025-01-13', '13:00:00', '10:00:00');",
        [owner],
    );
    assert!(reversed.is_err());
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
