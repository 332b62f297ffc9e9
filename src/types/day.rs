//! Calendar days without time or zone.

use std::fmt;
use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate};
use regex::Regex;

use super::FieldType;
use crate::error::Rejection;

static DAY_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9]{4})-([0-9]{2})-([0-9]{2})$").expect("Invalid day regex")
});

/// A calendar day.
///
/// Ordered chronologically. `Display` renders `2009/7/13`; the raw form
/// used in sources is `2009-07-13`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Day(NaiveDate);

impl Day {
    /// The day, if it exists in the proleptic Gregorian calendar.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    /// The year.
    pub fn year(&self) -> i32 {
        self.0.year()
    }

    /// The month, 1 to 12.
    pub fn month(&self) -> u32 {
        self.0.month()
    }

    /// The day of month, starting at 1.
    pub fn day(&self) -> u32 {
        self.0.day()
    }

    /// The underlying date.
    pub fn date(&self) -> NaiveDate {
        self.0
    }

    /// Render as `yyyy-mm-dd`.
    pub fn to_iso(&self) -> String {
        self.0.format("%Y-%m-%d").to_string()
    }
}

impl From<NaiveDate> for Day {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl From<Day> for NaiveDate {
    fn from(day: Day) -> Self {
        day.0
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.year(), self.month(), self.day())
    }
}

/// Days in `yyyy-mm-dd` form.
#[derive(Debug, Clone, Copy, Default)]
pub struct DayType;

impl DayType {
    fn rejection(raw: &str) -> Rejection {
        Rejection::new(format!(
            "must be a day formatted as yyyy-mm-dd, but was '{}'",
            raw
        ))
    }
}

impl FieldType for DayType {
    type Value = Day;

    fn type_name(&self) -> &'static str {
        "day"
    }

    fn parse(&self, raw: &str) -> Result<Day, Rejection> {
        let caps = DAY_REGEX.captures(raw).ok_or_else(|| Self::rejection(raw))?;
        let part = |i: usize| caps.get(i).map(|m| m.as_str()).unwrap_or_default();

        let year = part(1).parse::<i32>().map_err(|e| Self::rejection(raw).caused_by(e))?;
        let month = part(2).parse::<u32>().map_err(|e| Self::rejection(raw).caused_by(e))?;
        let day = part(3).parse::<u32>().map_err(|e| Self::rejection(raw).caused_by(e))?;

        Day::from_ymd(year, month, day).ok_or_else(|| Self::rejection(raw))
    }

    fn check(&self, value: &Day) -> Result<(), Rejection> {
        if (0..=9999).contains(&value.year()) {
            Ok(())
        } else {
            Err(Rejection::new(format!(
                "must be a day between 0000-01-01 and 9999-12-31, but was {}",
                value
            )))
        }
    }

    fn render(&self, value: &Day) -> String {
        value.to_iso()
    }
}
