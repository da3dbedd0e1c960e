//! Batch cancellation of stored notification handles.
//!
//! # Invariants
//! - Every distinct handle gets exactly one cancel request.
//! - An unknown handle counts as already gone, not as a failure.
//! - A failing handle never stops the rest of the batch.

use crate::model::task::NotificationHandle;
use crate::notify::{NotificationService, NotifyError};
use log::warn;
use std::collections::HashSet;

/// Handle that could not be cancelled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CancelFailure {
    pub handle: NotificationHandle,
    pub error: NotifyError,
}

/// Outcome of one `cancel_all` batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CancelReport {
    /// Handles disarmed by this batch.
    pub cancelled: usize,
    /// Handles the service no longer knew (fired or expired).
    pub already_gone: usize,
    pub failures: Vec<CancelFailure>,
}

impl CancelReport {
    /// Number of cancel requests issued.
    pub fn attempted(&self) -> usize {
        self.cancelled + self.already_gone + self.failures.len()
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Cancels every handle, aggregating failures into one report.
///
/// Emits a single warning line when any handle fails.
pub fn cancel_all<N>(notifier: &N, handles: &[NotificationHandle]) -> CancelReport
where
    N: NotificationService + ?Sized,
{
    let mut report = CancelReport::default();
    let mut seen = HashSet::new();

    for handle in handles {
        if !seen.insert(handle) {
            continue;
        }
        match notifier.cancel(handle) {
            Ok(()) => report.cancelled += 1,
            Err(NotifyError::UnknownHandle(_)) => report.already_gone += 1,
            Err(error) => report.failures.push(CancelFailure {
                handle: handle.clone(),
                error,
            }),
        }
    }

    if !report.is_clean() {
        let first_error = report
            .failures
            .first()
            .map(|failure| failure.error.to_string())
            .unwrap_or_default();
        warn!(
            "event=reminder_cancel module=schedule status=partial attempted={} failed={} error={}",
            report.attempted(),
            report.failures.len(),
            first_error
        );
    }

    report
}
