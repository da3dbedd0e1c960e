//! Domain model for to-do tasks and their reminders.
//!
//! # Responsibility
//! - Define canonical task records shared by service, storage and FFI.
//! - Keep recurrence categories a closed set.
//!
//! # Invariants
//! - Every task is identified by a stable `TaskId`.
//! - Notification handles are always a list, possibly empty.

pub mod category;
pub mod task;
