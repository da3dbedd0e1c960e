//! Reminder scheduling policy.
//!
//! # Responsibility
//! - Decide which triggers a task needs from its category, time and weekdays.
//!
//! # Invariants
//! - The policy is pure: the same inputs and `now` give the same output.
//! - No time means no triggers, for every category.
//! - `Someday` yields at most one trigger per distinct weekday, Sunday first.

use crate::model::category::{weekday_from_index, weekday_index, Category};
use crate::schedule::trigger::{minute_slot, next_daily_occurrence, Trigger};
use chrono::{NaiveDateTime, NaiveTime, Timelike, Weekday};
use std::collections::BTreeSet;

/// Computes the triggers for one task.
///
/// - `Today`: one `Once` trigger at the next occurrence of the minute slot
///   (today if strictly after `now`, else tomorrow).
/// - `Daily`: one `Daily` rule; the platform computes its first occurrence.
/// - `Someday`: one `Weekly` rule per distinct weekday.
pub fn compute_triggers(
    category: Category,
    time: Option<NaiveTime>,
    weekdays: &[Weekday],
    now: NaiveDateTime,
) -> Vec<Trigger> {
    let Some(time) = time else {
        return Vec::new();
    };
    let slot = minute_slot(time);

    match category {
        Category::Today => next_daily_occurrence(slot, now)
            .map(|at| Trigger::Once { at })
            .into_iter()
            .collect(),
        Category::Daily => vec![Trigger::Daily {
            hour: slot.hour(),
            minute: slot.minute(),
        }],
        Category::Someday => unique_weekdays(weekdays)
            .into_iter()
            .map(|weekday| Trigger::Weekly {
                weekday,
                hour: slot.hour(),
                minute: slot.minute(),
            })
            .collect(),
    }
}

/// Deduplicates weekdays and orders them by Sunday-based index.
pub fn unique_weekdays(weekdays: &[Weekday]) -> Vec<Weekday> {
    weekdays
        .iter()
        .map(|weekday| weekday_index(*weekday))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .filter_map(weekday_from_index)
        .collect()
}
