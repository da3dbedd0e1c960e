//! Core domain logic for the daily to-do reminder app.
//! This crate is the single source of truth for task and reminder invariants.

pub mod clock;
pub mod db;
pub mod display;
pub mod logging;
pub mod model;
pub mod notify;
pub mod repo;
pub mod schedule;
pub mod service;

pub use clock::{Clock, FixedClock, SystemClock};
pub use logging::{init_logging, logging_status, LoggingError};
pub use model::category::{weekday_from_index, weekday_index, Category, CategoryParseError};
pub use model::task::{NotificationHandle, TaskDraft, TaskId, TaskRecord, TaskValidationError};
pub use notify::memory::{InMemoryNotifier, ScheduledNotification};
pub use notify::{
    NotificationContent, NotificationPriority, NotificationService, NotificationSettings,
    NotifyError, NotifyResult, PermissionStatus, PERMISSION_DENIED_ALERT,
};
pub use repo::task_repo::{
    RepoError, RepoResult, SqliteTaskRepository, TaskRepository, TASKS_STORAGE_KEY,
};
pub use schedule::cancel::{cancel_all, CancelFailure, CancelReport};
pub use schedule::policy::compute_triggers;
pub use schedule::trigger::{resolve_wall_clock, Trigger};
pub use service::task_service::{BootstrapReport, TaskService, TaskServiceError};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
