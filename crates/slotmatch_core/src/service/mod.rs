//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Bind identity and privilege from `Caller` before touching storage.
//! - Keep FFI/CLI layers decoupled from storage details.

pub mod availability_service;
pub mod session_service;
pub mod slot_service;
