//! Calendar-day key identifying one journal slot.

use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifies exactly one note slot: a calendar day.
///
/// The month is stored 0-based (January is `0`), matching the in-memory
/// representation used throughout the crate. On-disk paths use the 1-based
/// month number; see [`DateKey::month_number`].
///
/// Ordering is by year, then month, then day, so sorting keys sorts them
/// chronologically.
///
/// # Examples
///
/// ```
/// use chronicle::domain::DateKey;
///
/// let key: DateKey = "2024-03-05".parse().unwrap();
/// assert_eq!(key.year(), 2024);
/// assert_eq!(key.month(), 2);
/// assert_eq!(key.month_number(), 3);
/// assert_eq!(key.day(), 5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DateKey {
    year: i32,
    month: u32,
    day: u32,
}

impl DateKey {
    /// Creates a key from a year, 0-based month and day of month.
    ///
    /// # Errors
    ///
    /// Returns an error if the triple is not a real calendar date or the
    /// year is negative.
    pub fn new(year: i32, month: u32, day: u32) -> Result<Self, ParseDateKeyError> {
        let raw = format!("{}-{}-{}", year, month.saturating_add(1), day);
        if year < 0 {
            return Err(ParseDateKeyError::new(raw, "year must not be negative"));
        }
        if month > 11 {
            return Err(ParseDateKeyError::new(raw, "month out of range"));
        }
        if NaiveDate::from_ymd_opt(year, month + 1, day).is_none() {
            return Err(ParseDateKeyError::new(raw, "no such calendar day"));
        }
        Ok(Self { year, month, day })
    }

    /// Creates a key from the 1-based month number used on disk.
    pub fn from_month_number(year: i32, month_number: u32, day: u32) -> Result<Self, ParseDateKeyError> {
        if month_number == 0 {
            return Err(ParseDateKeyError::new(
                format!("{}-0-{}", year, day),
                "month numbers start at 1",
            ));
        }
        Self::new(year, month_number - 1, day)
    }

    /// Returns the key for today's date in the local timezone.
    pub fn today() -> Self {
        let date = Local::now().date_naive();
        // The local clock never reports a year before 0.
        Self {
            year: date.year(),
            month: date.month0(),
            day: date.day(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    /// Returns the 0-based month.
    pub fn month(&self) -> u32 {
        self.month
    }

    /// Returns the 1-based month, as used in directory names.
    pub fn month_number(&self) -> u32 {
        self.month + 1
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    /// Converts to a chrono date.
    pub fn to_naive_date(&self) -> NaiveDate {
        // Validated on construction.
        NaiveDate::from_ymd_opt(self.year, self.month + 1, self.day).unwrap_or_default()
    }
}

impl TryFrom<NaiveDate> for DateKey {
    type Error = ParseDateKeyError;

    /// Converts a chrono date, rejecting negative years like [`DateKey::new`].
    fn try_from(date: NaiveDate) -> Result<Self, Self::Error> {
        Self::new(date.year(), date.month0(), date.day())
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month + 1, self.day)
    }
}

/// Error returned when a date key cannot be parsed or constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseDateKeyError {
    value: String,
    reason: String,
}

impl ParseDateKeyError {
    fn new(value: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Returns the invalid value that caused this error.
    pub fn invalid_value(&self) -> &str {
        &self.value
    }
}

impl fmt::Display for ParseDateKeyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid date '{}': {}", self.value, self.reason)
    }
}

impl std::error::Error for ParseDateKeyError {}

impl FromStr for DateKey {
    type Err = ParseDateKeyError;

    /// Parses `YYYY-MM-DD` or the word `today`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("today") {
            return Ok(Self::today());
        }
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map_err(|e| ParseDateKeyError::new(s, e.to_string()))
            .and_then(|date| {
                Self::try_from(date).map_err(|e| ParseDateKeyError::new(s, e.reason))
            })
    }
}

impl Serialize for DateKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DateKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
