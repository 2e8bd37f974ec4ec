//! Caller identity and privilege gate.
//!
//! # Responsibility
//! - Carry the identity resolved by the session layer into core services.
//! - Gate privileged entry points on the pre-validated `is_privileged` flag.
//!
//! # Invariants
//! - Core never re-derives privilege; it only reads `Caller::is_privileged`.
//! - Self-service writes always bind the owner to `Caller::user_id`.

use crate::model::availability::UserId;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Authenticated caller as supplied by the identity collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub user_id: UserId,
    pub is_privileged: bool,
}

impl Caller {
    pub fn regular(user_id: UserId) -> Self {
        Self {
            user_id,
            is_privileged: false,
        }
    }

    pub fn privileged(user_id: UserId) -> Self {
        Self {
            user_id,
            is_privileged: true,
        }
    }
}

/// Access failures produced before core logic runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessError {
    /// No valid session for the presented credentials.
    NotAuthenticated,
    /// Authenticated, but the operation requires a privileged caller.
    Forbidden { operation: &'static str },
}

impl Display for AccessError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotAuthenticated => write!(f, "authentication credentials were not provided"),
            Self::Forbidden { operation } => {
                write!(f, "permission denied: `{operation}` requires a privileged caller")
            }
        }
    }
}

impl Error for AccessError {}

/// Rejects non-privileged callers for `operation`.
pub fn require_privileged(caller: &Caller, operation: &'static str) -> Result<(), AccessError> {
    if caller.is_privileged {
        Ok(())
    } else {
        Err(AccessError::Forbidden { operation })
    }
}
