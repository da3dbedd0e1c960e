//! Notification service port.
//!
//! # Responsibility
//! - Define the contract the host notification subsystem implements.
//! - Define notification content and one-time presentation settings.
//!
//! # Invariants
//! - `configure` runs once before any `schedule` call.
//! - Cancelling an unknown handle reports `NotifyError::UnknownHandle`,
//!   which callers treat as success.

pub mod memory;

use crate::model::category::Category;
use crate::model::task::NotificationHandle;
use crate::schedule::trigger::Trigger;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type NotifyResult<T> = Result<T, NotifyError>;

/// Prompt shown to the user when notification permission is refused.
pub const PERMISSION_DENIED_ALERT: &str = "Permission for notifications not granted!";

/// Notification subsystem errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifyError {
    /// Scheduling attempted before `configure`.
    NotConfigured,
    /// Handle refers to nothing (already fired, expired or never issued).
    UnknownHandle(NotificationHandle),
    /// Platform-side failure with a diagnostic message.
    Platform(String),
}

impl Display for NotifyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotConfigured => write!(f, "notification service is not configured"),
            Self::UnknownHandle(handle) => write!(f, "unknown notification handle: {handle}"),
            Self::Platform(message) => write!(f, "notification platform error: {message}"),
        }
    }
}

impl Error for NotifyError {}

/// Notification permission state reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
    Undetermined,
}

impl PermissionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Granted => "granted",
            Self::Denied => "denied",
            Self::Undetermined => "undetermined",
        }
    }
}

/// Process-wide presentation settings applied once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationSettings {
    pub show_banner: bool,
    pub play_sound: bool,
    pub set_badge: bool,
    pub show_in_list: bool,
    /// Android channel id; ignored on platforms without channels.
    pub channel_id: String,
    pub channel_name: String,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            show_banner: true,
            play_sound: true,
            set_badge: false,
            show_in_list: true,
            channel_id: "default".to_string(),
            channel_name: "default".to_string(),
        }
    }
}

/// Delivery priority requested from the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NotificationPriority {
    #[default]
    Default,
    /// Heads-up delivery (Android `HIGH`).
    High,
}

impl NotificationPriority {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::High => "high",
        }
    }
}

/// Content shown when a reminder fires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationContent {
    pub title: String,
    pub body: String,
    pub sound: bool,
    pub priority: NotificationPriority,
}

impl NotificationContent {
    /// Builds reminder content for one task.
    pub fn for_task(text: &str, category: Category) -> Self {
        let title = match category {
            Category::Today => "📝 To-Do Reminder",
            Category::Daily => "📝 Daily To-Do Reminder",
            Category::Someday => "📝 Weekly To-Do Reminder",
        };
        Self {
            title: title.to_string(),
            body: text.to_string(),
            sound: true,
            priority: NotificationPriority::High,
        }
    }
}

/// Contract implemented by the host notification subsystem.
pub trait NotificationService {
    /// Applies one-time presentation settings.
    fn configure(&self, settings: &NotificationSettings) -> NotifyResult<()>;
    /// Asks the user for permission to post notifications.
    fn request_permission(&self) -> NotifyResult<PermissionStatus>;
    /// Arms one trigger and returns its handle.
    fn schedule(
        &self,
        content: &NotificationContent,
        trigger: &Trigger,
    ) -> NotifyResult<NotificationHandle>;
    /// Disarms one handle.
    fn cancel(&self, handle: &NotificationHandle) -> NotifyResult<()>;
}

impl<T: NotificationService + ?Sized> NotificationService for &T {
    fn configure(&self, settings: &NotificationSettings) -> NotifyResult<()> {
        (**self).configure(settings)
    }

    fn request_permission(&self) -> NotifyResult<PermissionStatus> {
        (**self).request_permission()
    }

    fn schedule(
        &self,
        content: &NotificationContent,
        trigger: &Trigger,
    ) -> NotifyResult<NotificationHandle> {
        (**self).schedule(content, trigger)
    }

    fn cancel(&self, handle: &NotificationHandle) -> NotifyResult<()> {
        (**self).cancel(handle)
    }
}
