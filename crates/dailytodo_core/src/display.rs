//! Presentation helpers for list rendering.
//!
//! Formatting only; no layout or theming decisions live here.

use crate::model::category::{weekday_from_index, Category};
use crate::model::task::TaskRecord;
use chrono::{FixedOffset, NaiveTime, Timelike, Weekday};

/// Formats a time-of-day on a 12-hour clock, e.g. `9:05 AM`.
pub fn format_time_12h(time: NaiveTime) -> String {
    let (is_pm, hour) = time.hour12();
    let suffix = if is_pm { "PM" } else { "AM" };
    format!("{hour}:{:02} {suffix}", time.minute())
}

/// Three-letter label for a Sunday-based weekday index.
pub fn weekday_label(index: u8) -> Option<&'static str> {
    weekday_from_index(index).map(|weekday| match weekday {
        Weekday::Sun => "Sun",
        Weekday::Mon => "Mon",
        Weekday::Tue => "Tue",
        Weekday::Wed => "Wed",
        Weekday::Thu => "Thu",
        Weekday::Fri => "Fri",
        Weekday::Sat => "Sat",
    })
}

/// Comma-separated weekday labels; invalid indices are skipped.
pub fn weekday_labels(indices: &[u8]) -> String {
    indices
        .iter()
        .filter_map(|index| weekday_label(*index))
        .collect::<Vec<_>>()
        .join(", ")
}

/// One-line reminder summary, e.g. `7:30 AM · Mon, Wed`, with the time read
/// at the local `offset`.
///
/// Returns `None` for tasks without a reminder time.
pub fn reminder_summary(task: &TaskRecord, offset: &FixedOffset) -> Option<String> {
    let time = format_time_12h(task.time_of_day_in(offset)?);
    if task.weekdays.is_empty() {
        return Some(time);
    }
    Some(format!("{time} · {}", weekday_labels(&task.weekdays)))
}

/// List section for one category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskSection<'a> {
    pub category: Category,
    pub tasks: Vec<&'a TaskRecord>,
}

/// Groups tasks by category in Today, Daily, Someday order.
///
/// Empty sections are omitted; order within a section is preserved.
pub fn group_by_category(tasks: &[TaskRecord]) -> Vec<TaskSection<'_>> {
    Category::ALL
        .iter()
        .map(|category| TaskSection {
            category: *category,
            tasks: tasks
                .iter()
                .filter(|task| task.category == *category)
                .collect(),
        })
        .filter(|section| !section.tasks.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{
        format_time_12h, group_by_category, reminder_summary, weekday_label, weekday_labels,
    };
    use crate::model::category::Category;
    use crate::model::task::TaskRecord;
    use chrono::{DateTime, FixedOffset, NaiveTime};
    use uuid::Uuid;

    fn task(text: &str, category: Category) -> TaskRecord {
        TaskRecord {
            id: Uuid::new_v4(),
            text: text.to_string(),
            category,
            time: None,
            weekdays: Vec::new(),
            completed: false,
            reminder_handles: Vec::new(),
        }
    }

    #[test]
    fn twelve_hour_clock_handles_noon_and_midnight() {
        let t = |h, m| NaiveTime::from_hms_opt(h, m, 0).unwrap();
        assert_eq!(format_time_12h(t(0, 5)), "12:05 AM");
        assert_eq!(format_time_12h(t(9, 0)), "9:00 AM");
        assert_eq!(format_time_12h(t(12, 30)), "12:30 PM");
        assert_eq!(format_time_12h(t(23, 59)), "11:59 PM");
    }

    #[test]
    fn weekday_labels_skip_invalid_indices() {
        assert_eq!(weekday_label(0), Some("Sun"));
        assert_eq!(weekday_label(9), None);
        assert_eq!(weekday_labels(&[1, 3, 9]), "Mon, Wed");
    }

    #[test]
    fn sections_follow_category_order_and_skip_empty_ones() {
        let tasks = vec![
            task("gym", Category::Someday),
            task("call mom", Category::Today),
            task("stretch", Category::Someday),
        ];

        let sections = group_by_category(&tasks);
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].category, Category::Today);
        assert_eq!(sections[1].category, Category::Someday);
        let texts: Vec<&str> = sections[1].tasks.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["gym", "stretch"]);
    }

    #[test]
    fn reminder_summary_shows_local_time_of_utc_picks() {
        let mut gym = task("gym", Category::Someday);
        gym.time = Some(DateTime::parse_from_rfc3339("2026-10-18T05:30:00Z").unwrap());
        gym.weekdays = vec![1, 3];
        let berlin = FixedOffset::east_opt(2 * 3600).unwrap();

        assert_eq!(
            reminder_summary(&gym, &berlin).as_deref(),
            Some("7:30 AM · Mon, Wed")
        );
        assert_eq!(reminder_summary(&task("read", Category::Daily), &berlin), None);
    }
}
