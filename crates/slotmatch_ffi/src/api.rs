//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose login/logout, availability registration and slot lookup to Dart.
//! - Map core errors onto request/response envelopes with a status kind.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - Identity always comes from the session token; owner is never a parameter.
//! - Missing slot-query parameters are rejected before core is invoked.

use chrono::{NaiveDate, NaiveTime};
use log::error;
use rusqlite::Connection;
use slotmatch_core::db::open_db;
use slotmatch_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    AccessError, AvailabilityService, AvailabilityServiceError, AvailabilityWindow, Caller,
    Registration, SessionService, SessionServiceError, Slot, SlotService, SlotServiceError,
    SqliteAvailabilityRepository, SqliteUserRepository, UpsertOutcome,
};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

const DB_FILE_NAME: &str = "slotmatch.sqlite3";
static DB_PATH: OnceLock<PathBuf> = OnceLock::new();

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMATS: [&str; 2] = ["%H:%M:%S", "%H:%M"];

/// Minimal health-check API for FRB smoke integration.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir`.
/// - Returns empty string on success and an error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Outcome classification carried by every envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseStatus {
    Ok,
    /// Client error: bad input, missing parameter or insufficient data.
    BadRequest,
    /// No valid session token.
    Unauthorized,
    /// Authenticated but not privileged.
    Forbidden,
    /// Storage or bootstrap failure.
    Internal,
}

/// One field-level validation violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Availability window in wire form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowItem {
    /// `YYYY-MM-DD`.
    pub date: String,
    /// `HH:MM:SS`.
    pub start_time: String,
    /// `HH:MM:SS`.
    pub end_time: String,
}

/// Response to `register_availability`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterAvailabilityResponse {
    pub status: ResponseStatus,
    /// `created` or `updated` on success.
    pub outcome: Option<String>,
    pub window: Option<WindowItem>,
    pub field_errors: Vec<FieldError>,
    pub message: String,
}

/// One common slot in wire form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotItem {
    pub date: String,
    pub start_time: String,
    pub end_time: String,
}

/// Response to `get_interview_slots`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterviewSlotsResponse {
    pub status: ResponseStatus,
    /// Ordered slots; empty on error or when nothing overlaps.
    pub slots: Vec<SlotItem>,
    pub message: String,
}

/// Response to `login` and `logout`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionResponse {
    pub status: ResponseStatus,
    pub token: Option<String>,
    pub message: String,
}

impl RegisterAvailabilityResponse {
    fn failure(status: ResponseStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            outcome: None,
            window: None,
            field_errors: Vec::new(),
            message: message.into(),
        }
    }

    fn field_failure(field: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            field_errors: vec![FieldError {
                field: field.to_string(),
                message: message.clone(),
            }],
            ..Self::failure(ResponseStatus::BadRequest, message)
        }
    }
}

impl InterviewSlotsResponse {
    fn failure(status: ResponseStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            slots: Vec::new(),
            message: message.into(),
        }
    }
}

impl SessionResponse {
    fn failure(status: ResponseStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            token: None,
            message: message.into(),
        }
    }
}

/// Exchanges credentials for a session token.
#[flutter_rust_bridge::frb(sync)]
pub fn login(username: String, password: String) -> SessionResponse {
    login_in(&resolve_db_path(), &username, &password)
}

/// Revokes the given session token.
#[flutter_rust_bridge::frb(sync)]
pub fn logout(token: String) -> SessionResponse {
    logout_in(&resolve_db_path(), &token)
}

/// Registers or updates the caller's availability for one date.
///
/// # FFI contract
/// - The token is checked first; an invalid token is `Unauthorized`
///   whatever the other fields hold.
/// - `date` is `YYYY-MM-DD`; times are `HH:MM` or `HH:MM:SS`.
/// - Parse and validation failures return `BadRequest` with `field_errors`.
#[flutter_rust_bridge::frb(sync)]
pub fn register_availability(
    token: String,
    date: String,
    start_time: String,
    end_time: String,
) -> RegisterAvailabilityResponse {
    register_availability_in(&resolve_db_path(), &token, &date, &start_time, &end_time)
}

/// Computes common one-hour slots for a candidate and an interviewer.
///
/// # FFI contract
/// - Requires a privileged session.
/// - Missing ids return `BadRequest` before any slot computation.
/// - Zero overlap is `Ok` with empty `slots` and a "no slots" message.
#[flutter_rust_bridge::frb(sync)]
pub fn get_interview_slots(
    token: String,
    candidate_id: Option<String>,
    interviewer_id: Option<String>,
) -> InterviewSlotsResponse {
    get_interview_slots_in(
        &resolve_db_path(),
        &token,
        candidate_id.as_deref(),
        interviewer_id.as_deref(),
    )
}

fn login_in(db_path: &Path, username: &str, password: &str) -> SessionResponse {
    let result = with_connection(db_path, |conn| {
        session_service(conn)?
            .login(username, password)
            .map_err(|err| session_failure(&err))
    });
    match result {
        Ok(session) => SessionResponse {
            status: ResponseStatus::Ok,
            token: Some(session.token),
            message: "Login successful".to_string(),
        },
        Err((status, message)) => SessionResponse::failure(status, message),
    }
}

fn logout_in(db_path: &Path, token: &str) -> SessionResponse {
    let result = with_connection(db_path, |conn| {
        session_service(conn)?
            .logout(token)
            .map_err(|err| match err {
                SessionServiceError::Access(AccessError::NotAuthenticated) => (
                    ResponseStatus::BadRequest,
                    "No user is logged in".to_string(),
                ),
                other => session_failure(&other),
            })
    });
    match result {
        Ok(()) => SessionResponse {
            status: ResponseStatus::Ok,
            token: None,
            message: "Logged out successfully".to_string(),
        },
        Err((status, message)) => SessionResponse::failure(status, message),
    }
}

fn register_availability_in(
    db_path: &Path,
    token: &str,
    date: &str,
    start_time: &str,
    end_time: &str,
) -> RegisterAvailabilityResponse {
    let result = with_connection(db_path, |conn| {
        let caller = authenticate(conn, token)?;
        let (date, start, end) = match parse_window_fields(date, start_time, end_time) {
            Ok(values) => values,
            Err(field_error) => {
                return Ok(RegisterAvailabilityResponse::field_failure(
                    &field_error.field,
                    field_error.message,
                ))
            }
        };
        let repo = SqliteAvailabilityRepository::try_new(conn).map_err(internal)?;
        Ok(registration_response(
            AvailabilityService::new(repo).register(&caller, date, start, end),
        ))
    });
    result.unwrap_or_else(|(status, message)| RegisterAvailabilityResponse::failure(status, message))
}

fn registration_response(
    result: Result<Registration, AvailabilityServiceError>,
) -> RegisterAvailabilityResponse {
    match result {
        Ok(registration) => {
            let message = match registration.outcome {
                UpsertOutcome::Created => "Availability registered successfully.",
                UpsertOutcome::Updated => "Availability updated successfully.",
            };
            RegisterAvailabilityResponse {
                status: ResponseStatus::Ok,
                outcome: Some(outcome_label(registration.outcome).to_string()),
                window: Some(to_window_item(&registration.window)),
                field_errors: Vec::new(),
                message: message.to_string(),
            }
        }
        Err(AvailabilityServiceError::InvalidWindow(err)) => {
            RegisterAvailabilityResponse::field_failure(err.field(), err.to_string())
        }
        Err(err) => RegisterAvailabilityResponse::failure(
            ResponseStatus::Internal,
            format!("register_availability failed: {err}"),
        ),
    }
}

fn get_interview_slots_in(
    db_path: &Path,
    token: &str,
    candidate_id: Option<&str>,
    interviewer_id: Option<&str>,
) -> InterviewSlotsResponse {
    let result = with_connection(db_path, |conn| {
        let caller = authenticate(conn, token)?;
        let (candidate_id, interviewer_id) = required_ids(candidate_id, interviewer_id)?;
        let repo = SqliteAvailabilityRepository::try_new(conn).map_err(internal)?;
        SlotService::new(repo)
            .interview_slots(&caller, candidate_id, interviewer_id)
            .map_err(|err| slot_failure(&err))
    });

    match result {
        Ok(slots) if slots.is_empty() => InterviewSlotsResponse {
            status: ResponseStatus::Ok,
            slots: Vec::new(),
            message: "No common slots available.".to_string(),
        },
        Ok(slots) => InterviewSlotsResponse {
            status: ResponseStatus::Ok,
            message: format!("Found {} common slot(s).", slots.len()),
            slots: slots.iter().map(to_slot_item).collect(),
        },
        Err((status, message)) => InterviewSlotsResponse::failure(status, message),
    }
}

type Failure = (ResponseStatus, String);

fn required_ids(
    candidate_id: Option<&str>,
    interviewer_id: Option<&str>,
) -> Result<(i64, i64), Failure> {
    let missing = || {
        (
            ResponseStatus::BadRequest,
            "Both candidate_id and interviewer_id are required.".to_string(),
        )
    };
    let candidate = candidate_id
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(missing)?;
    let interviewer = interviewer_id
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(missing)?;
    Ok((parse_id("candidate_id", candidate)?, parse_id("interviewer_id", interviewer)?))
}

fn parse_id(name: &str, value: &str) -> Result<i64, Failure> {
    value.parse::<i64>().map_err(|_| {
        (
            ResponseStatus::BadRequest,
            format!("{name} must be an integer user id, got `{value}`"),
        )
    })
}

fn parse_window_fields(
    date: &str,
    start_time: &str,
    end_time: &str,
) -> Result<(NaiveDate, NaiveTime, NaiveTime), FieldError> {
    Ok((
        parse_date(date)?,
        parse_time("start_time", start_time)?,
        parse_time("end_time", end_time)?,
    ))
}

fn parse_date(value: &str) -> Result<NaiveDate, FieldError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|_| FieldError {
        field: "date".to_string(),
        message: format!("date must be YYYY-MM-DD, got `{}`", value.trim()),
    })
}

fn parse_time(field: &str, value: &str) -> Result<NaiveTime, FieldError> {
    let trimmed = value.trim();
    TIME_FORMATS
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(trimmed, format).ok())
        .ok_or_else(|| FieldError {
            field: field.to_string(),
            message: format!("{field} must be HH:MM or HH:MM:SS, got `{trimmed}`"),
        })
}

fn with_connection<T>(
    db_path: &Path,
    f: impl FnOnce(&Connection) -> Result<T, Failure>,
) -> Result<T, Failure> {
    let conn = open_db(db_path).map_err(|err| {
        error!("event=ffi_call module=ffi status=error error_code=db_open_failed");
        (ResponseStatus::Internal, format!("DB open failed: {err}"))
    })?;
    f(&conn)
}

fn session_service(conn: &Connection) -> Result<SessionService<SqliteUserRepository<'_>>, Failure> {
    let repo = SqliteUserRepository::try_new(conn).map_err(internal)?;
    Ok(SessionService::new(repo))
}

fn authenticate(conn: &Connection, token: &str) -> Result<Caller, Failure> {
    session_service(conn)?
        .authenticate(token)
        .map_err(|err| session_failure(&err))
}

fn session_failure(err: &SessionServiceError) -> Failure {
    match err {
        SessionServiceError::InvalidCredentials => {
            (ResponseStatus::BadRequest, "Invalid credentials".to_string())
        }
        SessionServiceError::Access(access) => access_failure(access),
        SessionServiceError::Repo(_) => (ResponseStatus::Internal, err.to_string()),
    }
}

fn slot_failure(err: &SlotServiceError) -> Failure {
    match err {
        SlotServiceError::Access(access) => access_failure(access),
        SlotServiceError::Slots(slots) => (ResponseStatus::BadRequest, slots.to_string()),
        SlotServiceError::Repo(_) => (ResponseStatus::Internal, err.to_string()),
    }
}

fn access_failure(err: &AccessError) -> Failure {
    let status = match err {
        AccessError::NotAuthenticated => ResponseStatus::Unauthorized,
        AccessError::Forbidden { .. } => ResponseStatus::Forbidden,
    };
    (status, err.to_string())
}

fn internal(err: impl std::fmt::Display) -> Failure {
    error!("event=ffi_call module=ffi status=error error_code=repo_init_failed error={err}");
    (ResponseStatus::Internal, err.to_string())
}

fn resolve_db_path() -> PathBuf {
    DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var("SLOTMATCH_DB_PATH") {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(DB_FILE_NAME)
        })
        .clone()
}

fn outcome_label(outcome: UpsertOutcome) -> &'static str {
    match outcome {
        UpsertOutcome::Created => "created",
        UpsertOutcome::Updated => "updated",
    }
}

fn to_window_item(window: &AvailabilityWindow) -> WindowItem {
    WindowItem {
        date: window.date.format(DATE_FORMAT).to_string(),
        start_time: window.start.format("%H:%M:%S").to_string(),
        end_time: window.end.format("%H:%M:%S").to_string(),
    }
}

fn to_slot_item(slot: &Slot) -> SlotItem {
    SlotItem {
        date: slot.date.format(DATE_FORMAT).to_string(),
        start_time: slot.start.format("%H:%M:%S").to_string(),
        end_time: slot.end.format("%H:%M:%S").to_string(),
    }
}
