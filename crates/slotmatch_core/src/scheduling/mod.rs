//! Pure slot computation over availability windows.
//!
//! # Responsibility
//! - Derive common one-hour slots from two users' window collections.
//!
//! # Invariants
//! - No I/O and no clock access; output depends only on inputs.
//! - Output order follows pairwise enumeration, never a global sort.

pub mod intersect;
