//! Task record domain model.
//!
//! # Responsibility
//! - Define the persisted task record and the creation draft.
//! - Validate record invariants before persistence and after load.
//!
//! # Invariants
//! - `id` is stable and never reused for another task.
//! - `text` is never empty after trimming.
//! - `weekdays` is non-empty only for `Category::Someday` with a `time`.
//! - `reminder_handles` is non-empty only when `time` is set.

use crate::model::category::{weekday_from_index, Category};
use chrono::{DateTime, FixedOffset, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for every task record.
pub type TaskId = Uuid;

/// Opaque handle returned by the notification service for one armed trigger.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotificationHandle(String);

impl NotificationHandle {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for NotificationHandle {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Persisted task record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub id: TaskId,
    /// Trimmed user text.
    pub text: String,
    pub category: Category,
    /// Picked reminder instant; its hour and minute in the device's local
    /// offset are the reminder slot.
    #[serde(default)]
    pub time: Option<DateTime<FixedOffset>>,
    /// Sunday-based weekday indices, ascending and unique.
    #[serde(default)]
    pub weekdays: Vec<u8>,
    #[serde(default)]
    pub completed: bool,
    /// One handle per armed trigger, in trigger order.
    #[serde(default)]
    pub reminder_handles: Vec<NotificationHandle>,
}

impl TaskRecord {
    /// Reminder time-of-day as seen on a clock at `offset`.
    ///
    /// Stored times may carry any offset (often `Z`); the slot is always
    /// read in the device's local offset.
    pub fn time_of_day_in(&self, offset: &FixedOffset) -> Option<NaiveTime> {
        self.time.map(|time| time.with_timezone(offset).time())
    }

    /// Selected weekdays as `chrono::Weekday`, skipping invalid indices.
    pub fn weekday_set(&self) -> Vec<Weekday> {
        self.weekdays
            .iter()
            .filter_map(|index| weekday_from_index(*index))
            .collect()
    }

    pub fn has_reminder(&self) -> bool {
        !self.reminder_handles.is_empty()
    }

    /// Validates record invariants.
    ///
    /// # Errors
    /// - Returns `NilId` for a nil UUID.
    /// - Returns `EmptyText` when text is blank.
    /// - Returns weekday errors for out-of-range, unsorted/duplicate or
    ///   misplaced weekday selections.
    /// - Returns `HandlesWithoutTime` when handles exist without a time.
    pub fn validate(&self) -> Result<(), TaskValidationError> {
        if self.id.is_nil() {
            return Err(TaskValidationError::NilId);
        }
        if self.text.trim().is_empty() {
            return Err(TaskValidationError::EmptyText);
        }
        if !self.weekdays.is_empty() {
            if self.category != Category::Someday {
                return Err(TaskValidationError::WeekdaysWithoutSomeday(self.category));
            }
            if self.time.is_none() {
                return Err(TaskValidationError::WeekdaysWithoutTime);
            }
        }
        for index in &self.weekdays {
            if weekday_from_index(*index).is_none() {
                return Err(TaskValidationError::WeekdayOutOfRange(*index));
            }
        }
        if self.weekdays.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(TaskValidationError::WeekdaysNotNormalized);
        }
        if self.time.is_none() && !self.reminder_handles.is_empty() {
            return Err(TaskValidationError::HandlesWithoutTime);
        }
        Ok(())
    }
}

/// User input collected by the form before a record exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    pub text: String,
    pub category: Category,
    pub time: Option<DateTime<FixedOffset>>,
    /// Raw weekday indices; duplicates are allowed here.
    pub weekdays: Vec<u8>,
}

impl TaskDraft {
    pub fn new(text: impl Into<String>, category: Category) -> Self {
        Self {
            text: text.into(),
            category,
            time: None,
            weekdays: Vec::new(),
        }
    }

    pub fn at(mut self, time: DateTime<FixedOffset>) -> Self {
        self.time = Some(time);
        self
    }

    pub fn on_weekdays(mut self, weekdays: impl IntoIterator<Item = u8>) -> Self {
        self.weekdays = weekdays.into_iter().collect();
        self
    }

    /// Returns the weekday indices a record built from this draft stores.
    ///
    /// Weekdays only survive for `Someday` drafts with a time; they come
    /// back ascending and deduplicated.
    pub fn normalized_weekdays(&self) -> Result<Vec<u8>, TaskValidationError> {
        if self.category != Category::Someday || self.time.is_none() {
            return Ok(Vec::new());
        }

        let mut unique = BTreeSet::new();
        for index in &self.weekdays {
            if weekday_from_index(*index).is_none() {
                return Err(TaskValidationError::WeekdayOutOfRange(*index));
            }
            unique.insert(*index);
        }
        Ok(unique.into_iter().collect())
    }
}

/// Domain validation errors for task records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskValidationError {
    NilId,
    EmptyText,
    WeekdayOutOfRange(u8),
    WeekdaysNotNormalized,
    WeekdaysWithoutSomeday(Category),
    WeekdaysWithoutTime,
    HandlesWithoutTime,
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilId => write!(f, "task id must not be nil"),
            Self::EmptyText => write!(f, "task text must not be empty"),
            Self::WeekdayOutOfRange(index) => {
                write!(f, "weekday index {index} is out of range 0..=6")
            }
            Self::WeekdaysNotNormalized => {
                write!(f, "weekdays must be ascending without duplicates")
            }
            Self::WeekdaysWithoutSomeday(category) => {
                write!(f, "weekdays are only allowed for someday tasks, got {category}")
            }
            Self::WeekdaysWithoutTime => write!(f, "weekdays require a reminder time"),
            Self::HandlesWithoutTime => {
                write!(f, "reminder handles require a reminder time")
            }
        }
    }
}

impl Error for TaskValidationError {}
