//! Task use-case service.
//!
//! # Responsibility
//! - Own the in-memory task list the UI renders.
//! - Orchestrate policy, notification service and persistence per use-case.
//!
//! # Invariants
//! - Notifications are scheduled before the record is persisted; the save is
//!   the commit point.
//! - A failed schedule rolls back the handles armed so far and persists
//!   nothing.
//! - Deleting a task cancels its handles before the record disappears.
//! - Persistence failures are logged and never roll back in-memory state.

use crate::clock::Clock;
use crate::model::category::weekday_from_index;
use crate::model::task::{NotificationHandle, TaskDraft, TaskId, TaskRecord, TaskValidationError};
use crate::notify::{
    NotificationContent, NotificationService, NotificationSettings, NotifyError,
    PermissionStatus, PERMISSION_DENIED_ALERT,
};
use crate::repo::task_repo::TaskRepository;
use crate::schedule::cancel::{cancel_all, CancelReport};
use crate::schedule::policy::compute_triggers;
use log::{debug, error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Service error for task use-cases.
#[derive(Debug)]
pub enum TaskServiceError {
    /// Draft or record violates task invariants.
    Validation(TaskValidationError),
    /// One-time notification setup failed.
    Configure(NotifyError),
    /// Arming a reminder failed; no record was created.
    Schedule(NotifyError),
    /// Target task does not exist.
    TaskNotFound(TaskId),
}

impl Display for TaskServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Configure(err) => write!(f, "notification setup failed: {err}"),
            Self::Schedule(err) => write!(f, "failed to schedule reminder: {err}"),
            Self::TaskNotFound(id) => write!(f, "task not found: {id}"),
        }
    }
}

impl Error for TaskServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Configure(err) | Self::Schedule(err) => Some(err),
            Self::TaskNotFound(_) => None,
        }
    }
}

impl From<TaskValidationError> for TaskServiceError {
    fn from(value: TaskValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Startup summary returned by `TaskService::bootstrap`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapReport {
    pub permission: PermissionStatus,
    /// Message the UI shows in a blocking alert, when set.
    pub permission_alert: Option<&'static str>,
    pub loaded_tasks: usize,
    /// Whether the stored list could be read.
    pub load_ok: bool,
}

/// Task service facade over repository, notifier and clock.
pub struct TaskService<R, N, C>
where
    R: TaskRepository,
    N: NotificationService,
    C: Clock,
{
    repo: R,
    notifier: N,
    clock: C,
    tasks: Vec<TaskRecord>,
}

impl<R, N, C> TaskService<R, N, C>
where
    R: TaskRepository,
    N: NotificationService,
    C: Clock,
{
    /// Creates a service with an empty in-memory list.
    ///
    /// Call `bootstrap` before adding tasks.
    pub fn new(repo: R, notifier: N, clock: C) -> Self {
        Self {
            repo,
            notifier,
            clock,
            tasks: Vec::new(),
        }
    }

    /// Configures notifications, requests permission and loads stored tasks.
    ///
    /// # Errors
    /// - Returns `Configure` when notification setup fails. Permission and
    ///   load failures are reported through the returned summary instead.
    pub fn bootstrap(
        &mut self,
        settings: &NotificationSettings,
    ) -> Result<BootstrapReport, TaskServiceError> {
        self.notifier
            .configure(settings)
            .map_err(TaskServiceError::Configure)?;

        let permission = match self.notifier.request_permission() {
            Ok(status) => status,
            Err(err) => {
                warn!("event=permission_request module=service status=error error={err}");
                PermissionStatus::Undetermined
            }
        };
        let permission_alert =
            (permission != PermissionStatus::Granted).then_some(PERMISSION_DENIED_ALERT);

        let load_ok = self.reload();
        info!(
            "event=service_bootstrap module=service status=ok permission={} tasks={} load_ok={}",
            permission.as_str(),
            self.tasks.len(),
            load_ok
        );

        Ok(BootstrapReport {
            permission,
            permission_alert,
            loaded_tasks: self.tasks.len(),
            load_ok,
        })
    }

    /// Replaces the in-memory list with the stored one.
    ///
    /// Returns `false` when loading failed; the list is then left empty.
    pub fn reload(&mut self) -> bool {
        match self.repo.load_tasks() {
            Ok(tasks) => {
                self.tasks = tasks;
                true
            }
            Err(err) => {
                error!("event=tasks_load module=service status=error error={err}");
                self.tasks.clear();
                false
            }
        }
    }

    /// Current list in insertion order.
    pub fn tasks(&self) -> &[TaskRecord] {
        &self.tasks
    }

    pub fn get(&self, id: TaskId) -> Option<&TaskRecord> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Creates a task, arming its reminders first.
    ///
    /// Returns `Ok(None)` without side effects when the text is blank.
    ///
    /// # Errors
    /// - Returns `Validation` for out-of-range weekday indices.
    /// - Returns `Schedule` when the notifier refuses a trigger; handles
    ///   armed earlier in the same call are cancelled.
    pub fn add_task(&mut self, draft: TaskDraft) -> Result<Option<TaskRecord>, TaskServiceError> {
        let text = draft.text.trim();
        if text.is_empty() {
            debug!("event=task_add module=service status=skipped reason=empty_text");
            return Ok(None);
        }

        let weekdays = draft.normalized_weekdays()?;
        let weekday_set: Vec<_> = weekdays
            .iter()
            .filter_map(|index| weekday_from_index(*index))
            .collect();
        let now = self.clock.now();
        let slot = draft.time.map(|time| time.with_timezone(now.offset()).time());
        let triggers = compute_triggers(draft.category, slot, &weekday_set, now.naive_local());

        let content = NotificationContent::for_task(text, draft.category);
        let mut handles: Vec<NotificationHandle> = Vec::with_capacity(triggers.len());
        for trigger in &triggers {
            match self.notifier.schedule(&content, trigger) {
                Ok(handle) => handles.push(handle),
                Err(err) => {
                    let rollback = cancel_all(&self.notifier, &handles);
                    error!(
                        "event=task_add module=service status=error error_code=schedule_failed kind={} rolled_back={} error={err}",
                        trigger.kind(),
                        rollback.cancelled
                    );
                    return Err(TaskServiceError::Schedule(err));
                }
            }
        }

        let record = TaskRecord {
            id: Uuid::new_v4(),
            text: text.to_string(),
            category: draft.category,
            time: draft.time,
            weekdays,
            completed: false,
            reminder_handles: handles,
        };
        if let Err(err) = record.validate() {
            cancel_all(&self.notifier, &record.reminder_handles);
            return Err(err.into());
        }

        self.tasks.push(record.clone());
        self.persist("task_add");
        info!(
            "event=task_add module=service status=ok category={} reminders={}",
            record.category,
            record.reminder_handles.len()
        );
        Ok(Some(record))
    }

    /// Flips the completed flag and returns the new value.
    pub fn toggle_completed(&mut self, id: TaskId) -> Result<bool, TaskServiceError> {
        let task = self
            .tasks
            .iter_mut()
            .find(|task| task.id == id)
            .ok_or(TaskServiceError::TaskNotFound(id))?;
        task.completed = !task.completed;
        let completed = task.completed;

        self.persist("task_toggle");
        Ok(completed)
    }

    /// Cancels every reminder of a task, then removes it.
    ///
    /// Cancellation failures are reported in the returned report; the task
    /// is removed regardless.
    pub fn delete_task(&mut self, id: TaskId) -> Result<CancelReport, TaskServiceError> {
        let index = self
            .tasks
            .iter()
            .position(|task| task.id == id)
            .ok_or(TaskServiceError::TaskNotFound(id))?;

        let report = cancel_all(&self.notifier, &self.tasks[index].reminder_handles);
        self.tasks.remove(index);
        self.persist("task_delete");
        info!(
            "event=task_delete module=service status=ok cancelled={} already_gone={} failed={}",
            report.cancelled,
            report.already_gone,
            report.failures.len()
        );
        Ok(report)
    }

    fn persist(&self, event: &str) {
        if let Err(err) = self.repo.save_tasks(&self.tasks) {
            error!(
                "event={event} module=service status=error error_code=save_failed tasks={} error={err}",
                self.tasks.len()
            );
        }
    }
}
