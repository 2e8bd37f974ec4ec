//! Flutter-facing boundary for SlotMatch core.

pub mod api;
