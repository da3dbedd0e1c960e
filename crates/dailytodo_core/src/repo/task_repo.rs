//! Task list repository contracts and SQLite key-value implementation.
//!
//! # Responsibility
//! - Persist the whole task list as one JSON array under a fixed key.
//! - Restore records with their structured time values on load.
//!
//! # Invariants
//! - A missing key loads as an empty list.
//! - `save_tasks` replaces the stored list in a single statement.
//! - Every loaded record passes `TaskRecord::validate()`.

use crate::db::DbError;
use crate::model::task::{TaskRecord, TaskValidationError};
use rusqlite::{params, Connection, OptionalExtension};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Storage key holding the serialized task list.
pub const TASKS_STORAGE_KEY: &str = "TASKS";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for task list persistence.
#[derive(Debug)]
pub enum RepoError {
    Validation(TaskValidationError),
    Db(DbError),
    Encode(serde_json::Error),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::Encode(err) => write!(f, "failed to encode task list: {err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted task data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::Encode(err) => Some(err),
            Self::InvalidData(_) => None,
        }
    }
}

impl From<TaskValidationError> for RepoError {
    fn from(value: TaskValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for the persisted task list.
pub trait TaskRepository {
    /// Loads the full list in stored order.
    fn load_tasks(&self) -> RepoResult<Vec<TaskRecord>>;
    /// Replaces the stored list.
    fn save_tasks(&self, tasks: &[TaskRecord]) -> RepoResult<()>;
}

impl<T: TaskRepository + ?Sized> TaskRepository for &T {
    fn load_tasks(&self) -> RepoResult<Vec<TaskRecord>> {
        (**self).load_tasks()
    }

    fn save_tasks(&self, tasks: &[TaskRecord]) -> RepoResult<()> {
        (**self).save_tasks(tasks)
    }
}

/// SQLite-backed task repository over the `kv_store` table.
pub struct SqliteTaskRepository<'conn> {
    conn: &'conn Connection,
    storage_key: String,
}

impl<'conn> SqliteTaskRepository<'conn> {
    /// Uses the default `TASKS` storage key.
    pub fn new(conn: &'conn Connection) -> Self {
        Self::with_storage_key(conn, TASKS_STORAGE_KEY)
    }

    pub fn with_storage_key(conn: &'conn Connection, storage_key: impl Into<String>) -> Self {
        Self {
            conn,
            storage_key: storage_key.into(),
        }
    }

    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }
}

impl TaskRepository for SqliteTaskRepository<'_> {
    fn load_tasks(&self) -> RepoResult<Vec<TaskRecord>> {
        let raw: Option<String> = self
            .conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1;",
                [self.storage_key.as_str()],
                |row| row.get(0),
            )
            .optional()?;

        let Some(raw) = raw else {
            return Ok(Vec::new());
        };
        decode_task_list(&raw)
    }

    fn save_tasks(&self, tasks: &[TaskRecord]) -> RepoResult<()> {
        let encoded = encode_task_list(tasks)?;
        self.conn.execute(
            "INSERT INTO kv_store (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![self.storage_key.as_str(), encoded],
        )?;
        Ok(())
    }
}

/// Encodes a validated task list as a JSON array.
pub fn encode_task_list(tasks: &[TaskRecord]) -> RepoResult<String> {
    for task in tasks {
        task.validate()?;
    }
    serde_json::to_string(tasks).map_err(RepoError::Encode)
}

/// Decodes a JSON array of task records and validates each one.
pub fn decode_task_list(raw: &str) -> RepoResult<Vec<TaskRecord>> {
    let tasks: Vec<TaskRecord> = serde_json::from_str(raw)
        .map_err(|err| RepoError::InvalidData(format!("task list is not valid JSON: {err}")))?;

    for task in &tasks {
        task.validate().map_err(|err| {
            RepoError::InvalidData(format!("task {} failed validation: {err}", task.id))
        })?;
    }
    Ok(tasks)
}
