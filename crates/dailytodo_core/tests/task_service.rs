use chrono::{DateTime, FixedOffset, NaiveDate, Weekday};
use dailytodo_core::db::open_db_in_memory;
use dailytodo_core::{
    Category, FixedClock, InMemoryNotifier, NotificationContent, NotificationHandle,
    NotificationService, NotificationSettings, NotifyError, NotifyResult, PermissionStatus,
    RepoError, RepoResult, SqliteTaskRepository, TaskDraft, TaskRecord, TaskRepository,
    TaskService, TaskServiceError, Trigger, PERMISSION_DENIED_ALERT,
};
use std::cell::{Cell, RefCell};
use uuid::Uuid;

fn instant(value: &str) -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339(value).unwrap()
}

fn clock() -> FixedClock {
    FixedClock(instant("2026-10-18T08:00:00+02:00"))
}

fn bootstrapped<'a>(
    repo: SqliteTaskRepository<'a>,
    notifier: &'a InMemoryNotifier,
) -> TaskService<SqliteTaskRepository<'a>, &'a InMemoryNotifier, FixedClock> {
    let mut service = TaskService::new(repo, notifier, clock());
    service
        .bootstrap(&NotificationSettings::default())
        .expect("bootstrap");
    service
}

#[test]
fn bootstrap_configures_notifier_and_loads_stored_tasks() {
    let conn = open_db_in_memory().unwrap();
    let stored = TaskRecord {
        id: Uuid::new_v4(),
        text: "existing".to_string(),
        category: Category::Today,
        time: None,
        weekdays: Vec::new(),
        completed: false,
        reminder_handles: Vec::new(),
    };
    SqliteTaskRepository::new(&conn)
        .save_tasks(std::slice::from_ref(&stored))
        .unwrap();

    let notifier = InMemoryNotifier::new();
    let mut service = TaskService::new(SqliteTaskRepository::new(&conn), &notifier, clock());
    let report = service.bootstrap(&NotificationSettings::default()).unwrap();

    assert_eq!(report.permission, PermissionStatus::Granted);
    assert_eq!(report.permission_alert, None);
    assert_eq!(report.loaded_tasks, 1);
    assert!(report.load_ok);
    assert_eq!(service.tasks(), &[stored]);
    assert_eq!(notifier.settings(), Some(NotificationSettings::default()));
}

#[test]
fn bootstrap_reports_denied_permission_alert() {
    let conn = open_db_in_memory().unwrap();
    let notifier = InMemoryNotifier::with_permission(PermissionStatus::Denied);
    let mut service = TaskService::new(SqliteTaskRepository::new(&conn), &notifier, clock());

    let report = service.bootstrap(&NotificationSettings::default()).unwrap();
    assert_eq!(report.permission, PermissionStatus::Denied);
    assert_eq!(report.permission_alert, Some(PERMISSION_DENIED_ALERT));
}

#[test]
fn bootstrap_with_corrupted_storage_starts_empty() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO kv_store (key, value) VALUES ('TASKS', '{broken')",
        [],
    )
    .unwrap();
    let notifier = InMemoryNotifier::new();
    let mut service = TaskService::new(SqliteTaskRepository::new(&conn), &notifier, clock());

    let report = service.bootstrap(&NotificationSettings::default()).unwrap();
    assert!(!report.load_ok);
    assert!(service.tasks().is_empty());
}

#[test]
fn blank_text_is_silently_rejected() {
    let conn = open_db_in_memory().unwrap();
    let notifier = InMemoryNotifier::new();
    let mut service = bootstrapped(SqliteTaskRepository::new(&conn), &notifier);

    let draft = TaskDraft::new("   ", Category::Daily).at(instant("2026-10-18T09:00:00+02:00"));
    assert_eq!(service.add_task(draft).unwrap(), None);
    assert!(service.tasks().is_empty());
    assert_eq!(notifier.pending_count(), 0);
    assert!(SqliteTaskRepository::new(&conn).load_tasks().unwrap().is_empty());
}

#[test]
fn add_today_task_schedules_one_shot_and_persists_handle() {
    let conn = open_db_in_memory().unwrap();
    let notifier = InMemoryNotifier::new();
    let mut service = bootstrapped(SqliteTaskRepository::new(&conn), &notifier);

    let draft =
        TaskDraft::new("  call mom ", Category::Today).at(instant("2026-10-18T09:00:00+02:00"));
    let task = service.add_task(draft).unwrap().expect("task created");

    assert_eq!(task.text, "call mom");
    assert_eq!(task.reminder_handles.len(), 1);
    let scheduled = notifier.scheduled();
    assert_eq!(scheduled.len(), 1);
    assert_eq!(scheduled[0].handle, task.reminder_handles[0]);
    assert_eq!(scheduled[0].content.body, "call mom");
    assert_eq!(
        scheduled[0].trigger,
        Trigger::Once {
            at: NaiveDate::from_ymd_opt(2026, 10, 18)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap()
        }
    );

    let stored = SqliteTaskRepository::new(&conn).load_tasks().unwrap();
    assert_eq!(stored, vec![task]);
}

#[test]
fn add_today_task_after_slot_fires_tomorrow() {
    let conn = open_db_in_memory().unwrap();
    let notifier = InMemoryNotifier::new();
    let mut service = bootstrapped(SqliteTaskRepository::new(&conn), &notifier);

    let draft = TaskDraft::new("stretch", Category::Today).at(instant("2026-10-18T07:00:00+02:00"));
    service.add_task(draft).unwrap().expect("task created");

    assert_eq!(
        notifier.scheduled()[0].trigger,
        Trigger::Once {
            at: NaiveDate::from_ymd_opt(2026, 10, 19)
                .unwrap()
                .and_hms_opt(7, 0, 0)
                .unwrap()
        }
    );
}

#[test]
fn utc_picked_time_is_scheduled_at_local_wall_clock() {
    let conn = open_db_in_memory().unwrap();
    let notifier = InMemoryNotifier::new();
    let mut service = bootstrapped(SqliteTaskRepository::new(&conn), &notifier);

    // 07:00Z is 09:00 on the +02:00 clock, one hour ahead of now.
    let today = TaskDraft::new("call mom", Category::Today).at(instant("2026-10-18T07:00:00.000Z"));
    let task = service.add_task(today).unwrap().expect("task created");
    let daily = TaskDraft::new("water plants", Category::Daily).at(instant("2026-10-18T05:15:00Z"));
    service.add_task(daily).unwrap().expect("task created");

    let triggers: Vec<Trigger> = notifier.scheduled().iter().map(|s| s.trigger).collect();
    assert_eq!(
        triggers,
        vec![
            Trigger::Once {
                at: NaiveDate::from_ymd_opt(2026, 10, 18)
                    .unwrap()
                    .and_hms_opt(9, 0, 0)
                    .unwrap()
            },
            Trigger::Daily { hour: 7, minute: 15 },
        ]
    );
    assert_eq!(task.time, Some(instant("2026-10-18T07:00:00Z")));
}

#[test]
fn add_someday_task_schedules_one_weekly_rule_per_weekday() {
    let conn = open_db_in_memory().unwrap();
    let notifier = InMemoryNotifier::new();
    let mut service = bootstrapped(SqliteTaskRepository::new(&conn), &notifier);

    let draft = TaskDraft::new("gym", Category::Someday)
        .at(instant("2026-10-18T07:30:00+02:00"))
        .on_weekdays([3, 1, 3]);
    let task = service.add_task(draft).unwrap().expect("task created");

    assert_eq!(task.weekdays, vec![1, 3]);
    assert_eq!(task.reminder_handles.len(), 2);
    let triggers: Vec<Trigger> = notifier.scheduled().iter().map(|s| s.trigger).collect();
    assert_eq!(
        triggers,
        vec![
            Trigger::Weekly {
                weekday: Weekday::Mon,
                hour: 7,
                minute: 30
            },
            Trigger::Weekly {
                weekday: Weekday::Wed,
                hour: 7,
                minute: 30
            },
        ]
    );
}

#[test]
fn someday_without_weekdays_and_untimed_tasks_get_no_handles() {
    let conn = open_db_in_memory().unwrap();
    let notifier = InMemoryNotifier::new();
    let mut service = bootstrapped(SqliteTaskRepository::new(&conn), &notifier);

    let someday = service
        .add_task(TaskDraft::new("someday", Category::Someday).at(instant("2026-10-18T07:30:00+02:00")))
        .unwrap()
        .expect("task created");
    let untimed = service
        .add_task(TaskDraft::new("untimed", Category::Daily).on_weekdays([2]))
        .unwrap()
        .expect("task created");

    assert!(someday.reminder_handles.is_empty());
    assert!(untimed.reminder_handles.is_empty());
    assert!(untimed.weekdays.is_empty());
    assert_eq!(notifier.pending_count(), 0);
    assert_eq!(service.tasks().len(), 2);
}

#[test]
fn out_of_range_weekday_is_rejected_before_scheduling() {
    let conn = open_db_in_memory().unwrap();
    let notifier = InMemoryNotifier::new();
    let mut service = bootstrapped(SqliteTaskRepository::new(&conn), &notifier);

    let draft = TaskDraft::new("gym", Category::Someday)
        .at(instant("2026-10-18T07:30:00+02:00"))
        .on_weekdays([1, 8]);
    let err = service.add_task(draft).unwrap_err();

    assert!(matches!(err, TaskServiceError::Validation(_)));
    assert_eq!(notifier.pending_count(), 0);
    assert!(service.tasks().is_empty());
}

#[test]
fn toggle_completed_flips_and_persists() {
    let conn = open_db_in_memory().unwrap();
    let notifier = InMemoryNotifier::new();
    let mut service = bootstrapped(SqliteTaskRepository::new(&conn), &notifier);
    let task = service
        .add_task(TaskDraft::new("laundry", Category::Today))
        .unwrap()
        .expect("task created");

    assert!(service.toggle_completed(task.id).unwrap());
    assert!(SqliteTaskRepository::new(&conn).load_tasks().unwrap()[0].completed);
    assert!(!service.toggle_completed(task.id).unwrap());

    let missing = Uuid::new_v4();
    assert!(matches!(
        service.toggle_completed(missing),
        Err(TaskServiceError::TaskNotFound(id)) if id == missing
    ));
}

#[test]
fn delete_cancels_every_handle_before_removing() {
    let conn = open_db_in_memory().unwrap();
    let notifier = InMemoryNotifier::new();
    let mut service = bootstrapped(SqliteTaskRepository::new(&conn), &notifier);

    let gym = service
        .add_task(
            TaskDraft::new("gym", Category::Someday)
                .at(instant("2026-10-18T07:30:00+02:00"))
                .on_weekdays([1, 3, 5]),
        )
        .unwrap()
        .expect("task created");
    let water = service
        .add_task(TaskDraft::new("water", Category::Daily).at(instant("2026-10-18T10:00:00+02:00")))
        .unwrap()
        .expect("task created");
    assert_eq!(notifier.pending_count(), 4);

    let report = service.delete_task(gym.id).unwrap();
    assert_eq!(report.cancelled, 3);
    assert!(report.is_clean());
    assert_eq!(notifier.pending_count(), 1);
    assert!(notifier.is_pending(&water.reminder_handles[0]));

    let stored = SqliteTaskRepository::new(&conn).load_tasks().unwrap();
    assert_eq!(stored, vec![water]);
}

#[test]
fn delete_after_one_shot_fired_treats_handle_as_gone() {
    let conn = open_db_in_memory().unwrap();
    let notifier = InMemoryNotifier::new();
    let mut service = bootstrapped(SqliteTaskRepository::new(&conn), &notifier);

    let task = service
        .add_task(TaskDraft::new("call mom", Category::Today).at(instant("2026-10-18T09:00:00+02:00")))
        .unwrap()
        .expect("task created");
    let fired = notifier.fire_due(
        NaiveDate::from_ymd_opt(2026, 10, 18)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap(),
    );
    assert_eq!(fired.len(), 1);

    let report = service.delete_task(task.id).unwrap();
    assert_eq!(report.cancelled, 0);
    assert_eq!(report.already_gone, 1);
    assert!(report.is_clean());
    assert!(service.tasks().is_empty());
}

#[test]
fn delete_unknown_task_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let notifier = InMemoryNotifier::new();
    let mut service = bootstrapped(SqliteTaskRepository::new(&conn), &notifier);

    let err = service.delete_task(Uuid::new_v4()).unwrap_err();
    assert!(matches!(err, TaskServiceError::TaskNotFound(_)));
}

/// Notifier that refuses the n-th schedule call.
struct FlakyNotifier {
    inner: InMemoryNotifier,
    fail_on: usize,
    calls: Cell<usize>,
}

impl NotificationService for FlakyNotifier {
    fn configure(&self, settings: &NotificationSettings) -> NotifyResult<()> {
        self.inner.configure(settings)
    }

    fn request_permission(&self) -> NotifyResult<PermissionStatus> {
        self.inner.request_permission()
    }

    fn schedule(
        &self,
        content: &NotificationContent,
        trigger: &Trigger,
    ) -> NotifyResult<NotificationHandle> {
        let call = self.calls.get() + 1;
        self.calls.set(call);
        if call == self.fail_on {
            return Err(NotifyError::Platform("alarm limit reached".to_string()));
        }
        self.inner.schedule(content, trigger)
    }

    fn cancel(&self, handle: &NotificationHandle) -> NotifyResult<()> {
        self.inner.cancel(handle)
    }
}

#[test]
fn schedule_failure_rolls_back_armed_handles_and_persists_nothing() {
    let conn = open_db_in_memory().unwrap();
    let notifier = FlakyNotifier {
        inner: InMemoryNotifier::new(),
        fail_on: 3,
        calls: Cell::new(0),
    };
    let mut service = TaskService::new(SqliteTaskRepository::new(&conn), &notifier, clock());
    service.bootstrap(&NotificationSettings::default()).unwrap();

    let draft = TaskDraft::new("gym", Category::Someday)
        .at(instant("2026-10-18T07:30:00+02:00"))
        .on_weekdays([1, 3, 5]);
    let err = service.add_task(draft).unwrap_err();

    assert!(matches!(err, TaskServiceError::Schedule(NotifyError::Platform(_))));
    assert_eq!(notifier.inner.pending_count(), 0);
    assert_eq!(notifier.inner.cancel_requests(), 2);
    assert!(service.tasks().is_empty());
    assert!(SqliteTaskRepository::new(&conn).load_tasks().unwrap().is_empty());
}

/// Repository whose saves always fail.
#[derive(Default)]
struct ReadOnlyRepo {
    save_attempts: RefCell<usize>,
}

impl TaskRepository for ReadOnlyRepo {
    fn load_tasks(&self) -> RepoResult<Vec<TaskRecord>> {
        Ok(Vec::new())
    }

    fn save_tasks(&self, _tasks: &[TaskRecord]) -> RepoResult<()> {
        *self.save_attempts.borrow_mut() += 1;
        Err(RepoError::InvalidData("disk full".to_string()))
    }
}

#[test]
fn save_failure_keeps_in_memory_state_and_scheduled_reminders() {
    let repo = ReadOnlyRepo::default();
    let notifier = InMemoryNotifier::new();
    let mut service = TaskService::new(&repo, &notifier, clock());
    service.bootstrap(&NotificationSettings::default()).unwrap();

    let task = service
        .add_task(TaskDraft::new("water", Category::Daily).at(instant("2026-10-18T10:00:00+02:00")))
        .unwrap()
        .expect("task created");

    assert_eq!(*repo.save_attempts.borrow(), 1);
    assert_eq!(service.tasks(), &[task.clone()]);
    assert!(notifier.is_pending(&task.reminder_handles[0]));
}
