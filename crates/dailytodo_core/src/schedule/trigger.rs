//! Trigger descriptors handed to the notification service.
//!
//! All instants are local wall-clock values; the host platform maps them to
//! its own clock. A wall-clock value inside a spring-forward gap does not
//! exist locally; [`resolve_wall_clock`] moves it to the first valid minute.

use chrono::{
    DateTime, Datelike, Days, Duration, LocalResult, NaiveDateTime, NaiveTime, TimeZone,
    Timelike, Weekday,
};
use serde::{Deserialize, Serialize};

/// One scheduling directive for the notification service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Trigger {
    /// Fires once at `at`, never repeats.
    Once { at: NaiveDateTime },
    /// Fires every day at `hour:minute`.
    Daily { hour: u32, minute: u32 },
    /// Fires every `weekday` at `hour:minute`.
    Weekly {
        weekday: Weekday,
        hour: u32,
        minute: u32,
    },
}

impl Trigger {
    pub fn repeats(&self) -> bool {
        !matches!(self, Self::Once { .. })
    }

    /// Stable descriptor kind string.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Once { .. } => "once",
            Self::Daily { .. } => "daily",
            Self::Weekly { .. } => "weekly",
        }
    }

    /// Wall-clock time-of-day this trigger fires at.
    pub fn slot(&self) -> NaiveTime {
        match *self {
            Self::Once { at } => at.time(),
            Self::Daily { hour, minute } | Self::Weekly { hour, minute, .. } => {
                NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN)
            }
        }
    }

    /// Returns the first fire instant strictly after `now`.
    ///
    /// Returns `None` for a one-shot trigger that already fired, or when the
    /// next instant falls outside the representable calendar.
    pub fn next_fire_after(&self, now: NaiveDateTime) -> Option<NaiveDateTime> {
        match *self {
            Self::Once { at } => (at > now).then_some(at),
            Self::Daily { .. } => next_daily_occurrence(self.slot(), now),
            Self::Weekly { weekday, .. } => next_weekly_occurrence(weekday, self.slot(), now),
        }
    }
}

/// Longest DST gap searched by `resolve_wall_clock`.
const MAX_GAP_MINUTES: i64 = 3 * 60;

/// Maps a wall-clock instant to a real instant in `tz`.
///
/// Times inside a DST gap move forward to the first minute that exists;
/// repeated times during a fall-back take the earlier instant. Returns
/// `None` when no valid minute follows within three hours.
pub fn resolve_wall_clock<Tz: TimeZone>(tz: &Tz, at: NaiveDateTime) -> Option<DateTime<Tz>> {
    resolve_with(at, |naive| tz.from_local_datetime(naive))
}

fn resolve_with<T>(
    at: NaiveDateTime,
    lookup: impl Fn(&NaiveDateTime) -> LocalResult<T>,
) -> Option<T> {
    for minutes in 0..=MAX_GAP_MINUTES {
        let candidate = at.checked_add_signed(Duration::minutes(minutes))?;
        match lookup(&candidate) {
            LocalResult::Single(value) => return Some(value),
            LocalResult::Ambiguous(earliest, _) => return Some(earliest),
            LocalResult::None => {}
        }
    }
    None
}

/// Truncates a time-of-day to its minute slot.
pub fn minute_slot(time: NaiveTime) -> NaiveTime {
    NaiveTime::from_hms_opt(time.hour(), time.minute(), 0).unwrap_or(time)
}

/// Next occurrence of `slot`: today when still ahead of `now`, otherwise
/// exactly one day later.
pub fn next_daily_occurrence(slot: NaiveTime, now: NaiveDateTime) -> Option<NaiveDateTime> {
    let today = now.date().and_time(slot);
    if today > now {
        return Some(today);
    }
    today.checked_add_days(Days::new(1))
}

/// Next occurrence of `slot` on `weekday`, strictly after `now`.
pub fn next_weekly_occurrence(
    weekday: Weekday,
    slot: NaiveTime,
    now: NaiveDateTime,
) -> Option<NaiveDateTime> {
    let target = weekday.num_days_from_sunday();
    let current = now.weekday().num_days_from_sunday();
    let days_ahead = (target + 7 - current) % 7;

    let candidate = now
        .date()
        .checked_add_days(Days::new(u64::from(days_ahead)))?
        .and_time(slot);
    if candidate > now {
        return Some(candidate);
    }
    candidate.checked_add_days(Days::new(7))
}
