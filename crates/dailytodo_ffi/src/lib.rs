//! Flutter-facing bindings for the daily to-do core.

pub mod api;
