//! Reminder recurrence categories and weekday indexing.
//!
//! # Responsibility
//! - Define the closed set of recurrence categories.
//! - Normalize the historical spellings used by earlier app revisions.
//! - Map weekday indices (`0=Sunday..6=Saturday`) to `chrono::Weekday`.
//!
//! # Invariants
//! - Unknown category strings are rejected, never defaulted.
//! - Weekday indices outside `0..=6` have no `Weekday` counterpart.

use chrono::Weekday;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Recurrence category chosen when a task is created.
///
/// Serialized as snake_case; deserialized through [`Category::parse`], so
/// stored spellings from any app revision load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum Category {
    /// One reminder at the next occurrence of the chosen time.
    Today,
    /// Repeating reminder every day at the chosen time.
    Daily,
    /// Repeating reminder on each selected weekday.
    Someday,
}

impl Category {
    /// All categories in list-section order.
    pub const ALL: [Category; 3] = [Category::Today, Category::Daily, Category::Someday];

    /// Stable storage/wire string.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Today => "today",
            Self::Daily => "daily",
            Self::Someday => "someday",
        }
    }

    /// User-facing label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Today => "Today",
            Self::Daily => "Every Day",
            Self::Someday => "Someday",
        }
    }

    /// Parses a category in any letter case: `today`, `daily`, `someday`,
    /// or `every day` with a space, `_`, `-` or nothing between the words.
    pub fn parse(value: &str) -> Result<Self, CategoryParseError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(CategoryParseError::Empty);
        }

        let lower = trimmed.to_lowercase();
        match lower.as_str() {
            "today" => Ok(Self::Today),
            "daily" => Ok(Self::Daily),
            "someday" => Ok(Self::Someday),
            other if is_every_day(other) => Ok(Self::Daily),
            _ => Err(CategoryParseError::Unknown(trimmed.to_string())),
        }
    }
}

fn is_every_day(value: &str) -> bool {
    value
        .strip_prefix("every")
        .and_then(|rest| rest.strip_suffix("day"))
        .is_some_and(|sep| matches!(sep, "" | " " | "_" | "-"))
}

impl Display for Category {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for Category {
    type Error = CategoryParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl FromStr for Category {
    type Err = CategoryParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Category parse errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryParseError {
    Empty,
    Unknown(String),
}

impl Display for CategoryParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "category must not be empty"),
            Self::Unknown(value) => write!(
                f,
                "unknown category `{value}`; expected today|daily|every day|someday"
            ),
        }
    }
}

impl Error for CategoryParseError {}

/// Maps a Sunday-based index (`0=Sunday..6=Saturday`) to a weekday.
pub fn weekday_from_index(index: u8) -> Option<Weekday> {
    match index {
        0 => Some(Weekday::Sun),
        1 => Some(Weekday::Mon),
        2 => Some(Weekday::Tue),
        3 => Some(Weekday::Wed),
        4 => Some(Weekday::Thu),
        5 => Some(Weekday::Fri),
        6 => Some(Weekday::Sat),
        _ => None,
    }
}

/// Returns the Sunday-based index of a weekday.
pub fn weekday_index(weekday: Weekday) -> u8 {
    // num_days_from_sunday is always < 7
    weekday.num_days_from_sunday() as u8
}
