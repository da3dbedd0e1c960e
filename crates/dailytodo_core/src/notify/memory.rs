//! In-process notification service.
//!
//! Records armed triggers instead of posting platform notifications. Used
//! by tests, the CLI and hosts without a notification subsystem.

use crate::model::task::NotificationHandle;
use crate::notify::{
    NotificationContent, NotificationService, NotificationSettings, NotifyError, NotifyResult,
    PermissionStatus,
};
use crate::schedule::trigger::Trigger;
use chrono::NaiveDateTime;
use log::debug;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

/// One armed notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledNotification {
    pub handle: NotificationHandle,
    pub content: NotificationContent,
    pub trigger: Trigger,
}

#[derive(Default)]
struct NotifierState {
    settings: Option<NotificationSettings>,
    next_seq: u64,
    scheduled: BTreeMap<NotificationHandle, ScheduledNotification>,
    cancel_requests: usize,
}

/// Thread-safe in-memory `NotificationService`.
pub struct InMemoryNotifier {
    permission: PermissionStatus,
    state: Mutex<NotifierState>,
}

impl Default for InMemoryNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryNotifier {
    /// Creates a notifier that grants permission.
    pub fn new() -> Self {
        Self::with_permission(PermissionStatus::Granted)
    }

    /// Creates a notifier answering permission requests with `permission`.
    ///
    /// Scheduling still succeeds when permission is denied; the platform
    /// just never delivers.
    pub fn with_permission(permission: PermissionStatus) -> Self {
        Self {
            permission,
            state: Mutex::new(NotifierState::default()),
        }
    }

    /// Returns settings applied by `configure`, if any.
    pub fn settings(&self) -> Option<NotificationSettings> {
        self.state().ok().and_then(|state| state.settings.clone())
    }

    /// Returns armed notifications ordered by handle.
    pub fn scheduled(&self) -> Vec<ScheduledNotification> {
        self.state()
            .map(|state| state.scheduled.values().cloned().collect())
            .unwrap_or_default()
    }

    pub fn pending_count(&self) -> usize {
        self.state().map(|state| state.scheduled.len()).unwrap_or(0)
    }

    pub fn is_pending(&self, handle: &NotificationHandle) -> bool {
        self.state()
            .map(|state| state.scheduled.contains_key(handle))
            .unwrap_or(false)
    }

    /// Total cancel calls received, including unknown handles.
    pub fn cancel_requests(&self) -> usize {
        self.state().map(|state| state.cancel_requests).unwrap_or(0)
    }

    /// Delivers one-shot notifications due at or before `now`.
    ///
    /// Delivered one-shots are forgotten, so later cancels see an unknown
    /// handle. Repeating triggers stay armed.
    pub fn fire_due(&self, now: NaiveDateTime) -> Vec<ScheduledNotification> {
        let Ok(mut state) = self.state() else {
            return Vec::new();
        };
        let due: Vec<NotificationHandle> = state
            .scheduled
            .values()
            .filter(|item| matches!(item.trigger, Trigger::Once { at } if at <= now))
            .map(|item| item.handle.clone())
            .collect();

        due.iter()
            .filter_map(|handle| state.scheduled.remove(handle))
            .collect()
    }

    fn state(&self) -> NotifyResult<MutexGuard<'_, NotifierState>> {
        self.state
            .lock()
            .map_err(|_| NotifyError::Platform("notifier state lock poisoned".to_string()))
    }
}

impl NotificationService for InMemoryNotifier {
    fn configure(&self, settings: &NotificationSettings) -> NotifyResult<()> {
        let mut state = self.state()?;
        state.settings = Some(settings.clone());
        Ok(())
    }

    fn request_permission(&self) -> NotifyResult<PermissionStatus> {
        Ok(self.permission)
    }

    fn schedule(
        &self,
        content: &NotificationContent,
        trigger: &Trigger,
    ) -> NotifyResult<NotificationHandle> {
        let mut state = self.state()?;
        if state.settings.is_none() {
            return Err(NotifyError::NotConfigured);
        }

        state.next_seq += 1;
        let handle = NotificationHandle::new(format!("mem-{:06}", state.next_seq));
        state.scheduled.insert(
            handle.clone(),
            ScheduledNotification {
                handle: handle.clone(),
                content: content.clone(),
                trigger: *trigger,
            },
        );
        debug!(
            "event=notification_schedule module=notify status=ok kind={} repeats={} priority={}",
            trigger.kind(),
            trigger.repeats(),
            content.priority.as_str()
        );
        Ok(handle)
    }

    fn cancel(&self, handle: &NotificationHandle) -> NotifyResult<()> {
        let mut state = self.state()?;
        state.cancel_requests += 1;
        match state.scheduled.remove(handle) {
            Some(_) => Ok(()),
            None => Err(NotifyError::UnknownHandle(handle.clone())),
        }
    }
}
