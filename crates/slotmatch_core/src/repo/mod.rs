//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Window writes enforce `validate_window` against the supplied date before SQL.
//! - Repository APIs return semantic errors (`UnknownUser`, `Conflict`) in
//!   addition to DB transport errors.

pub mod availability_repo;
mod schema;
pub mod user_repo;

pub use availability_repo::{RepoError, RepoResult};
