//! Domain model for availability windows, derived slots and user accounts.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Own the write-time validation rules for availability windows.
//!
//! # Invariants
//! - A window always has `end > start`.
//! - A slot always spans exactly one hour on a single date.
//! - Windows are never deleted by core; slots are never persisted.

pub mod availability;
pub mod slot;
pub mod user;
