//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the task-list persistence contract.
//! - Isolate SQLite and JSON encoding details from the service layer.
//!
//! # Invariants
//! - Writes validate every record before touching storage.
//! - Reads reject invalid persisted state instead of masking it.

pub mod task_repo;
