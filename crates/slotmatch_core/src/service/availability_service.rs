//! Self-service availability registration.
//!
//! # Responsibility
//! - Validate candidate windows against the current date.
//! - Upsert the caller's own window and report `Created` or `Updated`.
//!
//! # Invariants
//! - Owner is always `caller.user_id`; no owner parameter is accepted.
//! - Validation runs before any persistence mutation.

use crate::access::Caller;
use crate::clock::{Clock, SystemClock};
use crate::model::availability::{validate_window, AvailabilityWindow, WindowValidationError};
use crate::repo::availability_repo::{AvailabilityRepository, RepoError, UpsertOutcome};
use chrono::{NaiveDate, NaiveTime};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for availability registration.
#[derive(Debug)]
pub enum AvailabilityServiceError {
    /// Candidate window broke a write-time rule.
    InvalidWindow(WindowValidationError),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for AvailabilityServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidWindow(err) => write!(f, "invalid window: {err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for AvailabilityServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidWindow(err) => Some(err),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<RepoError> for AvailabilityServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::InvalidWindow(err),
            other => Self::Repo(other),
        }
    }
}

impl From<WindowValidationError> for AvailabilityServiceError {
    fn from(value: WindowValidationError) -> Self {
        Self::InvalidWindow(value)
    }
}

/// Result of one registration call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Registration {
    pub outcome: UpsertOutcome,
    /// Window as persisted after the call.
    pub window: AvailabilityWindow,
}

/// Availability use-case facade over repository implementations.
pub struct AvailabilityService<R: AvailabilityRepository, C: Clock = SystemClock> {
    repo: R,
    clock: C,
}

impl<R: AvailabilityRepository> AvailabilityService<R> {
    /// Creates a service validating against the local system date.
    pub fn new(repo: R) -> Self {
        Self::with_clock(repo, SystemClock)
    }
}

impl<R: AvailabilityRepository, C: Clock> AvailabilityService<R, C> {
    pub fn with_clock(repo: R, clock: C) -> Self {
        Self { repo, clock }
    }

    /// Registers or replaces the caller's window for `date`.
    ///
    /// # Errors
    /// - `InvalidWindow` for a past date or `end <= start`.
    /// - `Repo` for storage failures, including an unknown caller id.
    pub fn register(
        &self,
        caller: &Caller,
        date: NaiveDate,
        start: NaiveTime,
        end: NaiveTime,
    ) -> Result<Registration, AvailabilityServiceError> {
        let today = self.clock.today();
        if let Err(err) = validate_window(date, start, end, today) {
            warn!(
                "event=availability_upsert module=service status=rejected field={}",
                err.field()
            );
            return Err(err.into());
        }

        let window = AvailabilityWindow::new(caller.user_id, date, start, end);
        let outcome = self.repo.upsert_window(&window, today)?;
        info!(
            "event=availability_upsert module=service status=ok outcome={}",
            outcome_label(outcome)
        );
        Ok(Registration { outcome, window })
    }

    /// Gets the caller's window for one date.
    pub fn window_for(
        &self,
        caller: &Caller,
        date: NaiveDate,
    ) -> Result<Option<AvailabilityWindow>, AvailabilityServiceError> {
        Ok(self.repo.get_window(caller.user_id, date)?)
    }

    /// Lists the caller's windows ordered by date.
    pub fn my_windows(
        &self,
        caller: &Caller,
    ) -> Result<Vec<AvailabilityWindow>, AvailabilityServiceError> {
        Ok(self.repo.list_windows(caller.user_id)?)
    }
}

fn outcome_label(outcome: UpsertOutcome) -> &'static str {
    match outcome {
        UpsertOutcome::Created => "created",
        UpsertOutcome::Updated => "updated",
    }
}
