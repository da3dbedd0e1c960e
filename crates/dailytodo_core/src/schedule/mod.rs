//! Reminder scheduling policy and its cancellation counterpart.
//!
//! # Responsibility
//! - Turn a task's category, time and weekdays into trigger descriptors.
//! - Disarm stored handles in one fault-tolerant batch.
//!
//! # Invariants
//! - Policy functions are stateless; `now` is always an explicit input.

pub mod cancel;
pub mod policy;
pub mod trigger;
