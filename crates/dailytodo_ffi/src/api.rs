//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose stable, use-case-level functions to Dart via FRB.
//! - Let the host own the platform notification subsystem: it asks for a
//!   reminder plan, arms it, then hands the resulting handles back on create.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Failures are reported through response envelopes, never thrown.
//! - Delete flow is two-phase: `task_reminder_handles` first, host cancels,
//!   then `task_delete`.

use chrono::{DateTime, FixedOffset, Local, NaiveDateTime, NaiveTime, Timelike};
use dailytodo_core::db::open_db;
use dailytodo_core::display::{reminder_summary, weekday_labels};
use dailytodo_core::{
    compute_triggers, core_version as core_version_inner, init_logging as init_logging_inner,
    ping as ping_inner, resolve_wall_clock, weekday_from_index, weekday_index, Category, Clock, NotificationHandle,
    RepoResult, SqliteTaskRepository, SystemClock, TaskDraft, TaskId, TaskRecord,
    TaskRepository, Trigger,
};
use log::info;
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};
use uuid::Uuid;

const ENTRY_DB_FILE_NAME: &str = "dailytodo.sqlite3";
static ENTRY_DB_PATH: OnceLock<PathBuf> = OnceLock::new();
// Serializes load-modify-save cycles across FFI threads.
static ENTRY_DB_LOCK: Mutex<()> = Mutex::new(());

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// One trigger the host must arm.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderTriggerItem {
    /// `once|daily|weekly`.
    pub kind: String,
    /// Sunday-based weekday index for weekly triggers.
    pub weekday: Option<u8>,
    pub hour: u32,
    pub minute: u32,
    /// RFC 3339 instant of the next fire in the device zone; times inside a
    /// DST gap move to the first existing minute.
    pub next_fire_at: Option<String>,
}

/// Reminder plan envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderPlanResponse {
    pub ok: bool,
    /// Triggers in arming order; empty when no reminder is needed.
    pub items: Vec<ReminderTriggerItem>,
    pub message: String,
}

impl ReminderPlanResponse {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            items: Vec::new(),
            message: message.into(),
        }
    }
}

/// Generic action response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskActionResponse {
    pub ok: bool,
    /// Affected task ID.
    pub task_id: Option<String>,
    pub message: String,
}

impl TaskActionResponse {
    fn success(message: impl Into<String>, task_id: TaskId) -> Self {
        Self {
            ok: true,
            task_id: Some(task_id.to_string()),
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            task_id: None,
            message: message.into(),
        }
    }
}

/// Task row for list rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskListItem {
    pub task_id: String,
    pub text: String,
    /// `today|daily|someday`.
    pub category: String,
    pub category_label: String,
    pub completed: bool,
    /// RFC 3339 reminder time.
    pub time: Option<String>,
    /// Local time plus weekdays, e.g. `7:30 AM · Mon, Wed`.
    pub reminder_summary: Option<String>,
    pub weekdays: Vec<u8>,
    pub weekday_labels: String,
}

/// Task list envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskListResponse {
    pub items: Vec<TaskListItem>,
    pub message: String,
}

/// Handles the host must cancel before deleting a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskHandlesResponse {
    pub ok: bool,
    pub handles: Vec<String>,
    pub message: String,
}

/// Computes the triggers the host must arm for a new task.
///
/// # FFI contract
/// - Sync call, pure computation against the local clock.
/// - Invalid category, time or weekday input returns `ok=false`.
#[flutter_rust_bridge::frb(sync)]
pub fn reminder_plan(
    category: String,
    hour: u32,
    minute: u32,
    weekdays: Vec<u8>,
) -> ReminderPlanResponse {
    let category = match Category::parse(&category) {
        Ok(category) => category,
        Err(err) => return ReminderPlanResponse::failure(format!("reminder_plan failed: {err}")),
    };
    let Some(time) = NaiveTime::from_hms_opt(hour, minute, 0) else {
        return ReminderPlanResponse::failure(format!(
            "reminder_plan failed: invalid time {hour}:{minute:02}"
        ));
    };
    let mut weekday_set = Vec::with_capacity(weekdays.len());
    for index in weekdays {
        match weekday_from_index(index) {
            Some(weekday) => weekday_set.push(weekday),
            None => {
                return ReminderPlanResponse::failure(format!(
                    "reminder_plan failed: weekday index {index} is out of range 0..=6"
                ))
            }
        }
    }

    let now = SystemClock.now().naive_local();
    let items: Vec<ReminderTriggerItem> = compute_triggers(category, Some(time), &weekday_set, now)
        .iter()
        .map(|trigger| to_trigger_item(trigger, now))
        .collect();
    let message = if items.is_empty() {
        "No reminder needed.".to_string()
    } else {
        format!("Planned {} reminder(s).", items.len())
    };
    ReminderPlanResponse {
        ok: true,
        items,
        message,
    }
}

/// Lists persisted tasks in insertion order.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Load failures return an empty list with an error message.
#[flutter_rust_bridge::frb(sync)]
pub fn task_list() -> TaskListResponse {
    match with_task_repo(|repo| repo.load_tasks()) {
        Ok(tasks) => {
            let offset = *SystemClock.now().offset();
            let items: Vec<TaskListItem> = tasks
                .iter()
                .map(|task| to_task_list_item(task, &offset))
                .collect();
            let message = format!("Loaded {} task(s).", items.len());
            TaskListResponse { items, message }
        }
        Err(err) => TaskListResponse {
            items: Vec::new(),
            message: format!("task_list failed: {err}"),
        },
    }
}

/// Persists a new task together with the handles the host already armed.
///
/// Input semantics:
/// - `time`: RFC 3339 timestamp of the picked reminder, or `None`.
/// - `reminder_handles`: one handle per item of the matching `reminder_plan`.
///
/// # FFI contract
/// - Blank text is ignored and returns `ok=false` without writing.
/// - Arm reminders before calling; this call is the commit point.
#[flutter_rust_bridge::frb(sync)]
pub fn task_create(
    text: String,
    category: String,
    time: Option<String>,
    weekdays: Vec<u8>,
    reminder_handles: Vec<String>,
) -> TaskActionResponse {
    let text = text.trim();
    if text.is_empty() {
        return TaskActionResponse::failure("Empty task ignored.");
    }
    let category = match Category::parse(&category) {
        Ok(category) => category,
        Err(err) => return TaskActionResponse::failure(format!("task_create failed: {err}")),
    };
    let time = match time.as_deref().map(DateTime::parse_from_rfc3339).transpose() {
        Ok(time) => time,
        Err(err) => {
            return TaskActionResponse::failure(format!("task_create failed: invalid time: {err}"))
        }
    };

    let mut draft = TaskDraft::new(text, category).on_weekdays(weekdays);
    draft.time = time;
    let weekdays = match draft.normalized_weekdays() {
        Ok(weekdays) => weekdays,
        Err(err) => return TaskActionResponse::failure(format!("task_create failed: {err}")),
    };
    let record = TaskRecord {
        id: Uuid::new_v4(),
        text: text.to_string(),
        category,
        time,
        weekdays,
        completed: false,
        reminder_handles: reminder_handles
            .into_iter()
            .map(NotificationHandle::new)
            .collect(),
    };

    let result = with_task_repo(|repo| {
        let mut tasks = repo.load_tasks()?;
        tasks.push(record.clone());
        repo.save_tasks(&tasks)
    });
    match result {
        Ok(()) => {
            info!(
                "event=task_create module=ffi status=ok category={} reminders={}",
                record.category,
                record.reminder_handles.len()
            );
            TaskActionResponse::success("Task created.", record.id)
        }
        Err(err) => TaskActionResponse::failure(format!("task_create failed: {err}")),
    }
}

/// Flips the completed flag of one task.
#[flutter_rust_bridge::frb(sync)]
pub fn task_toggle(task_id: String) -> TaskActionResponse {
    let id = match parse_task_id(&task_id) {
        Ok(id) => id,
        Err(message) => return TaskActionResponse::failure(message),
    };
    let result = with_task_repo(|repo| {
        let mut tasks = repo.load_tasks()?;
        let Some(task) = tasks.iter_mut().find(|task| task.id == id) else {
            return Ok(None);
        };
        task.completed = !task.completed;
        let completed = task.completed;
        repo.save_tasks(&tasks)?;
        Ok(Some(completed))
    });
    match result {
        Ok(Some(true)) => TaskActionResponse::success("Task completed.", id),
        Ok(Some(false)) => TaskActionResponse::success("Task reopened.", id),
        Ok(None) => TaskActionResponse::failure(format!("task not found: {id}")),
        Err(err) => TaskActionResponse::failure(format!("task_toggle failed: {err}")),
    }
}

/// Returns the reminder handles of one task for host-side cancellation.
#[flutter_rust_bridge::frb(sync)]
pub fn task_reminder_handles(task_id: String) -> TaskHandlesResponse {
    let id = match parse_task_id(&task_id) {
        Ok(id) => id,
        Err(message) => {
            return TaskHandlesResponse {
                ok: false,
                handles: Vec::new(),
                message,
            }
        }
    };
    match with_task_repo(|repo| repo.load_tasks()) {
        Ok(tasks) => match tasks.into_iter().find(|task| task.id == id) {
            Some(task) => TaskHandlesResponse {
                ok: true,
                message: format!("{} handle(s) to cancel.", task.reminder_handles.len()),
                handles: task
                    .reminder_handles
                    .iter()
                    .map(|handle| handle.as_str().to_string())
                    .collect(),
            },
            None => TaskHandlesResponse {
                ok: false,
                handles: Vec::new(),
                message: format!("task not found: {id}"),
            },
        },
        Err(err) => TaskHandlesResponse {
            ok: false,
            handles: Vec::new(),
            message: format!("task_reminder_handles failed: {err}"),
        },
    }
}

/// Removes one task. Cancel its handles first.
#[flutter_rust_bridge::frb(sync)]
pub fn task_delete(task_id: String) -> TaskActionResponse {
    let id = match parse_task_id(&task_id) {
        Ok(id) => id,
        Err(message) => return TaskActionResponse::failure(message),
    };
    let result = with_task_repo(|repo| {
        let mut tasks = repo.load_tasks()?;
        let before = tasks.len();
        tasks.retain(|task| task.id != id);
        if tasks.len() == before {
            return Ok(false);
        }
        repo.save_tasks(&tasks)?;
        Ok(true)
    });
    match result {
        Ok(true) => TaskActionResponse::success("Task deleted.", id),
        Ok(false) => TaskActionResponse::failure(format!("task not found: {id}")),
        Err(err) => TaskActionResponse::failure(format!("task_delete failed: {err}")),
    }
}

fn parse_task_id(value: &str) -> Result<TaskId, String> {
    Uuid::parse_str(value.trim()).map_err(|_| format!("invalid task id `{}`", value.trim()))
}

fn resolve_entry_db_path() -> PathBuf {
    ENTRY_DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var("DAILYTODO_DB_PATH") {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(ENTRY_DB_FILE_NAME)
        })
        .clone()
}

fn with_task_repo<T>(
    f: impl FnOnce(&SqliteTaskRepository<'_>) -> RepoResult<T>,
) -> Result<T, String> {
    let _guard = ENTRY_DB_LOCK
        .lock()
        .map_err(|_| "task DB lock poisoned".to_string())?;
    let db_path = resolve_entry_db_path();
    let conn = open_db(&db_path).map_err(|err| format!("task DB open failed: {err}"))?;
    let repo = SqliteTaskRepository::new(&conn);
    f(&repo).map_err(|err| err.to_string())
}

fn to_trigger_item(trigger: &Trigger, now: NaiveDateTime) -> ReminderTriggerItem {
    let slot = trigger.slot();
    let weekday = match trigger {
        Trigger::Weekly { weekday, .. } => Some(weekday_index(*weekday)),
        Trigger::Once { .. } | Trigger::Daily { .. } => None,
    };
    ReminderTriggerItem {
        kind: trigger.kind().to_string(),
        weekday,
        hour: slot.hour(),
        minute: slot.minute(),
        next_fire_at: trigger
            .next_fire_after(now)
            .and_then(|at| resolve_wall_clock(&Local, at))
            .map(|at| at.to_rfc3339()),
    }
}

fn to_task_list_item(task: &TaskRecord, offset: &FixedOffset) -> TaskListItem {
    TaskListItem {
        task_id: task.id.to_string(),
        text: task.text.clone(),
        category: task.category.as_str().to_string(),
        category_label: task.category.label().to_string(),
        completed: task.completed,
        time: task.time.map(|time| time.to_rfc3339()),
        reminder_summary: reminder_summary(task, offset),
        weekdays: task.weekdays.clone(),
        weekday_labels: weekday_labels(&task.weekdays),
    }
}
