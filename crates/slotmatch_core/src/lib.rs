//! Core domain logic for SlotMatch.
//! This crate is the single source of truth for availability and slot rules.

pub mod access;
pub mod clock;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod scheduling;
pub mod service;

pub use access::{require_privileged, AccessError, Caller};
pub use clock::{Clock, FixedClock, SystemClock};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::availability::{validate_window, AvailabilityWindow, UserId, WindowValidationError};
pub use model::slot::Slot;
pub use model::user::UserAccount;
pub use repo::availability_repo::{
    AvailabilityRepository, RepoError, RepoResult, SqliteAvailabilityRepository, UpsertOutcome,
};
pub use repo::user_repo::{SqliteUserRepository, UserRepository};
pub use scheduling::intersect::{intersect, MissingSide, SlotError};
pub use service::availability_service::{
    AvailabilityService, AvailabilityServiceError, Registration,
};
pub use service::session_service::{Session, SessionService, SessionServiceError};
pub use service::slot_service::{SlotService, SlotServiceError};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
