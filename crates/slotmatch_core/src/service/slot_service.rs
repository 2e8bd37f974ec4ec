//! Privileged interview-slot lookup.
//!
//! # Invariants
//! - Only privileged callers reach the engine.
//! - Each party's windows are read once; stale reads are acceptable.

use crate::access::{require_privileged, AccessError, Caller};
use crate::model::availability::UserId;
use crate::model::slot::Slot;
use crate::repo::availability_repo::{AvailabilityRepository, RepoError};
use crate::scheduling::intersect::{intersect, SlotError};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

const INTERVIEW_SLOTS_OPERATION: &str = "interview_slots";

/// Service error for slot lookup.
#[derive(Debug)]
pub enum SlotServiceError {
    Access(AccessError),
    Slots(SlotError),
    Repo(RepoError),
}

impl Display for SlotServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Access(err) => write!(f, "{err}"),
            Self::Slots(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SlotServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Access(err) => Some(err),
            Self::Slots(err) => Some(err),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<AccessError> for SlotServiceError {
    fn from(value: AccessError) -> Self {
        Self::Access(value)
    }
}

impl From<SlotError> for SlotServiceError {
    fn from(value: SlotError) -> Self {
        Self::Slots(value)
    }
}

impl From<RepoError> for SlotServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Slot lookup facade over an availability repository.
pub struct SlotService<R: AvailabilityRepository> {
    repo: R,
}

impl<R: AvailabilityRepository> SlotService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Computes common one-hour slots for two users.
    ///
    /// # Errors
    /// - `Access(Forbidden)` when `caller` is not privileged.
    /// - `Slots(NoAvailabilityData)` when either user has no windows.
    pub fn interview_slots(
        &self,
        caller: &Caller,
        candidate_id: UserId,
        interviewer_id: UserId,
    ) -> Result<Vec<Slot>, SlotServiceError> {
        if let Err(err) = require_privileged(caller, INTERVIEW_SLOTS_OPERATION) {
            warn!("event=slots_computed module=service status=forbidden");
            return Err(err.into());
        }

        let candidate = self.repo.list_windows(candidate_id)?;
        let interviewer = self.repo.list_windows(interviewer_id)?;
        let slots = intersect(&candidate, &interviewer).inspect_err(|err| {
            info!("event=slots_computed module=service status=no_data error={err}");
        })?;

        info!(
            "event=slots_computed module=service status=ok count={}",
            slots.len()
        );
        Ok(slots)
    }
}
