//! Week and day identifiers.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Days, FixedOffset, NaiveDate, TimeZone, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result, ValidationError};

/// Day number (counted from 0001-01-01 = 1) of Monday 1970-01-05.
const EPOCH_MONDAY_CE: i32 = 719_167;

/// Stable identifier of an ISO calendar week, rendered as `YYYY-Www`.
///
/// Internally the week is represented by its Monday, which makes ordering
/// and week arithmetic trivial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WeekKey {
    monday: NaiveDate,
}

impl WeekKey {
    /// The ISO week containing `date`.
    pub fn from_date(date: NaiveDate) -> Result<Self> {
        let back = u64::from(date.weekday().num_days_from_monday());
        let monday = date
            .checked_sub_days(Days::new(back))
            .ok_or_else(|| CoreError::invalid_value("date", format!("{date} has no representable week")))?;
        // The Sunday must be representable too, otherwise the week is cut off.
        monday
            .checked_add_days(Days::new(6))
            .ok_or_else(|| CoreError::invalid_value("date", format!("{date} has no representable week")))?;
        Ok(Self { monday })
    }

    /// Parse a `YYYY-Www` key.
    pub fn parse(key: &str) -> Result<Self> {
        let malformed = || CoreError::from(ValidationError::MalformedWeekKey(key.to_string()));

        let (year, week) = key.split_once("-W").ok_or_else(malformed)?;
        if year.is_empty() || week.len() != 2 || !week.bytes().all(|b| b.is_ascii_digit()) {
            return Err(malformed());
        }
        let year: i32 = year.parse().map_err(|_| malformed())?;
        let week: u32 = week.parse().map_err(|_| malformed())?;

        let monday = NaiveDate::from_isoywd_opt(year, week, Weekday::Mon).ok_or_else(malformed)?;
        let parsed = Self::from_date(monday)?;
        // Only the rendered form is accepted, so "+2024" or "02024" never alias a week.
        if parsed.to_string() != key {
            return Err(malformed());
        }
        Ok(parsed)
    }

    /// ISO week-numbering year.
    pub fn iso_year(&self) -> i32 {
        self.monday.iso_week().year()
    }

    /// ISO week number (1..=53).
    pub fn week(&self) -> u32 {
        self.monday.iso_week().week()
    }

    /// First day of the week.
    pub fn monday(&self) -> NaiveDate {
        self.monday
    }

    /// Number of weeks since the week of 1970-01-05 (negative before it).
    ///
    /// Strictly increasing by one from each week to the next.
    pub fn index(&self) -> i64 {
        i64::from(self.monday.num_days_from_ce() - EPOCH_MONDAY_CE).div_euclid(7)
    }
}

impl fmt::Display for WeekKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-W{:02}", self.iso_year(), self.week())
    }
}

impl FromStr for WeekKey {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for WeekKey {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<WeekKey> for String {
    fn from(key: WeekKey) -> Self {
        key.to_string()
    }
}

/// Identifier of a single calendar day, rendered as `YYYY-MM-DD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DayKey(NaiveDate);

impl DayKey {
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Parse a `YYYY-MM-DD` key.
    pub fn parse(key: &str) -> Result<Self> {
        NaiveDate::parse_from_str(key.trim(), "%Y-%m-%d")
            .map(Self)
            .map_err(|e| CoreError::invalid_value("day", format!("'{key}': {e}")))
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    /// Whether `other` is the calendar day right after this one.
    pub fn is_followed_by(&self, other: &DayKey) -> bool {
        self.0.succ_opt() == Some(other.0)
    }
}

impl fmt::Display for DayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl From<NaiveDate> for DayKey {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

/// A week key together with its seven days, Monday first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekRange {
    pub week_key: WeekKey,
    pub day_keys: [DayKey; 7],
}

impl WeekRange {
    /// The week containing `date`.
    pub fn containing(date: NaiveDate) -> Result<Self> {
        Self::for_key(WeekKey::from_date(date)?)
    }

    /// The days of an already known week.
    pub fn for_key(week_key: WeekKey) -> Result<Self> {
        let monday = week_key.monday();
        let mut day_keys = [DayKey(monday); 7];
        for (offset, slot) in day_keys.iter_mut().enumerate() {
            let date = monday
                .checked_add_days(Days::new(offset as u64))
                .ok_or_else(|| CoreError::invalid_value("week", format!("{week_key} is out of range")))?;
            *slot = DayKey(date);
        }
        Ok(Self { week_key, day_keys })
    }

    /// The week containing `timestamp`, using the date in the timestamp's own offset.
    pub fn for_timestamp<Tz: TimeZone>(timestamp: &DateTime<Tz>) -> Result<Self> {
        Self::containing(timestamp.date_naive())
    }

    /// The week containing a Unix timestamp in milliseconds, seen from `offset`.
    pub fn from_unix_millis(millis: i64, offset: FixedOffset) -> Result<Self> {
        let timestamp = DateTime::from_timestamp_millis(millis)
            .ok_or(ValidationError::InvalidTimestamp(millis))?;
        Self::for_timestamp(&timestamp.with_timezone(&offset))
    }

    pub fn contains(&self, day: &DayKey) -> bool {
        self.day_keys.contains(day)
    }
}
