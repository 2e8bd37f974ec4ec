//! Availability repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist one window per `(owner, date)` and report create vs update.
//! - Keep SQL and text encodings of dates/times inside the persistence boundary.
//!
//! # Invariants
//! - Writes are validated against the caller-supplied `today`: no past
//!   dates and `end > start`.
//! - The existence check and the write share one `BEGIN IMMEDIATE`
//!   transaction; the write itself is `ON CONFLICT DO UPDATE` on the unique
//!   `(owner_id, date)` key.
//! - Read paths reject malformed rows instead of masking them.

use crate::db::DbError;
use crate::model::availability::{
    validate_window, AvailabilityWindow, UserId, WindowValidationError,
};
use crate::repo::schema::ensure_table_ready;
use chrono::{NaiveDate, NaiveTime};
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M:%S%.f";

const WINDOW_SELECT_SQL: &str = "SELECT
    owner_id,
    date,
    start_time,
    end_time
FROM availability";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error shared by availability and identity storage.
#[derive(Debug)]
pub enum RepoError {
    Validation(WindowValidationError),
    Db(DbError),
    /// Referenced account does not exist.
    UnknownUser(UserId),
    /// Unique constraint on a user-supplied value was hit.
    Conflict(String),
    InvalidData(String),
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::UnknownUser(id) => write!(f, "user not found: {id}"),
            Self::Conflict(message) => write!(f, "conflict: {message}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "missing required column `{table}.{column}`")
            }
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}"
            ),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<WindowValidationError> for RepoError {
    fn from(value: WindowValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Which branch an upsert took.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpsertOutcome {
    Created,
    Updated,
}

/// Repository interface for availability windows.
pub trait AvailabilityRepository {
    /// Inserts or replaces the window for `(window.owner, window.date)`.
    ///
    /// Rejects a window dated before `today` or with `end <= start`.
    fn upsert_window(
        &self,
        window: &AvailabilityWindow,
        today: NaiveDate,
    ) -> RepoResult<UpsertOutcome>;
    /// Gets the window for one `(owner, date)` key.
    fn get_window(&self, owner: UserId, date: NaiveDate)
        -> RepoResult<Option<AvailabilityWindow>>;
    /// Lists all windows of `owner`, ordered by date.
    fn list_windows(&self, owner: UserId) -> RepoResult<Vec<AvailabilityWindow>>;
}

/// SQLite-backed availability repository.
pub struct SqliteAvailabilityRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAvailabilityRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_table_ready(
            conn,
            "availability",
            &["owner_id", "date", "start_time", "end_time", "updated_at"],
        )?;
        Ok(Self { conn })
    }
}

impl AvailabilityRepository for SqliteAvailabilityRepository<'_> {
    fn upsert_window(
        &self,
        window: &AvailabilityWindow,
        today: NaiveDate,
    ) -> RepoResult<UpsertOutcome> {
        validate_window(window.date, window.start, window.end, today)?;

        let date_text = format_date(window.date);
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        if !user_exists_in_tx(&tx, window.owner)? {
            return Err(RepoError::UnknownUser(window.owner));
        }

        let existed: i64 = tx.query_row(
            "SELECT EXISTS(
                SELECT 1 FROM availability WHERE owner_id = ?1 AND date = ?2
            );",
            params![window.owner, date_text.as_str()],
            |row| row.get(0),
        )?;

        tx.execute(
            "INSERT INTO availability (owner_id, date, start_time, end_time)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT (owner_id, date) DO UPDATE SET
                start_time = excluded.start_time,
                end_time = excluded.end_time,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![
                window.owner,
                date_text.as_str(),
                format_time(window.start),
                format_time(window.end),
            ],
        )?;
        tx.commit()?;

        Ok(if existed == 1 {
            UpsertOutcome::Updated
        } else {
            UpsertOutcome::Created
        })
    }

    fn get_window(
        &self,
        owner: UserId,
        date: NaiveDate,
    ) -> RepoResult<Option<AvailabilityWindow>> {
        let mut stmt = self.conn.prepare(&format!(
            "{WINDOW_SELECT_SQL}
             WHERE owner_id = ?1 AND date = ?2;"
        ))?;
        let mut rows = stmt.query(params![owner, format_date(date)])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_window_row(row)?));
        }
        Ok(None)
    }

    fn list_windows(&self, owner: UserId) -> RepoResult<Vec<AvailabilityWindow>> {
        let mut stmt = self.conn.prepare(&format!(
            "{WINDOW_SELECT_SQL}
             WHERE owner_id = ?1
             ORDER BY date ASC;"
        ))?;
        let mut rows = stmt.query([owner])?;
        let mut windows = Vec::new();
        while let Some(row) = rows.next()? {
            windows.push(parse_window_row(row)?);
        }
        Ok(windows)
    }
}

fn user_exists_in_tx(tx: &Transaction<'_>, user_id: UserId) -> RepoResult<bool> {
    let exists: i64 = tx.query_row(
        "SELECT EXISTS(SELECT 1 FROM users WHERE id = ?1);",
        [user_id],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn parse_window_row(row: &Row<'_>) -> RepoResult<AvailabilityWindow> {
    let date_text: String = row.get("date")?;
    let date = NaiveDate::parse_from_str(&date_text, DATE_FORMAT).map_err(|_| {
        RepoError::InvalidData(format!("invalid date `{date_text}` in availability.date"))
    })?;

    let window = AvailabilityWindow {
        owner: row.get("owner_id")?,
        date,
        start: parse_time_column(row, "start_time")?,
        end: parse_time_column(row, "end_time")?,
    };
    window.validate().map_err(|err| {
        RepoError::InvalidData(format!("stored window for {date_text} is invalid: {err}"))
    })?;
    Ok(window)
}

fn parse_time_column(row: &Row<'_>, column: &'static str) -> RepoResult<NaiveTime> {
    let text: String = row.get(column)?;
    NaiveTime::parse_from_str(&text, TIME_FORMAT).map_err(|_| {
        RepoError::InvalidData(format!("invalid time `{text}` in availability.{column}"))
    })
}

fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn format_time(time: NaiveTime) -> String {
    time.format(TIME_FORMAT).to_string()
}
