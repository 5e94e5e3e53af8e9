//! Addressing for monthly blocks.
//!
//! A [`LogKey`] pairs a habit id with a [`MonthKey`] and renders as
//! `<habit>_<YYYY-MM>`. Parsing splits on the last underscore, so habit ids
//! may contain underscores themselves.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::LogKeyError;

/// A calendar month, ordered chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    year: i32,
    month: u32,
}

impl MonthKey {
    /// Any month chrono can represent a date in.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|_| Self { year, month })
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// Number of days in this month.
    pub fn days(&self) -> u32 {
        let first = NaiveDate::from_ymd_opt(self.year, self.month, 1);
        let next = if self.month == 12 {
            NaiveDate::from_ymd_opt(self.year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(self.year, self.month + 1, 1)
        };
        match (first, next) {
            (Some(first), Some(next)) => (next - first).num_days() as u32,
            _ => 31,
        }
    }

    /// The date for `day` in this month, if it exists.
    pub fn date(&self, day: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, day)
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if (0..=9999).contains(&self.year) {
            write!(f, "{:04}-{:02}", self.year, self.month)
        } else {
            // Expanded year form: explicit sign, at least four digits.
            write!(f, "{:+05}-{:02}", self.year, self.month)
        }
    }
}

impl FromStr for MonthKey {
    type Err = LogKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || LogKeyError::InvalidMonth(s.to_string());
        let (year_str, month_str) = s.rsplit_once('-').ok_or_else(invalid)?;
        if month_str.len() != 2 || !month_str.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        let (signed, digits) = match year_str.strip_prefix(|c: char| c == '+' || c == '-') {
            Some(rest) => (true, rest),
            None => (false, year_str),
        };
        let digits_ok = digits.bytes().all(|b| b.is_ascii_digit());
        let width_ok = if signed { digits.len() >= 4 } else { digits.len() == 4 };
        if !digits_ok || !width_ok {
            return Err(invalid());
        }

        let year: i32 = year_str.parse().map_err(|_| invalid())?;
        // Only the form Display produces is accepted.
        if signed == (0..=9999).contains(&year) {
            return Err(invalid());
        }
        let month: u32 = month_str.parse().map_err(|_| invalid())?;
        Self::new(year, month).ok_or_else(invalid)
    }
}

impl Serialize for MonthKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for MonthKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Address of one monthly block: a habit and a month.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LogKey {
    pub habit_id: String,
    pub month: MonthKey,
}

impl LogKey {
    pub fn new(habit_id: impl Into<String>, month: MonthKey) -> Self {
        Self {
            habit_id: habit_id.into(),
            month,
        }
    }

    pub fn for_date(habit_id: impl Into<String>, date: NaiveDate) -> Self {
        Self::new(habit_id, MonthKey::from_date(date))
    }
}

impl fmt::Display for LogKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.habit_id, self.month)
    }
}

impl FromStr for LogKey {
    type Err = LogKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (habit_id, month) = s
            .rsplit_once('_')
            .ok_or_else(|| LogKeyError::InvalidKey(s.to_string()))?;
        if habit_id.is_empty() {
            return Err(LogKeyError::InvalidKey(s.to_string()));
        }
        Ok(Self::new(habit_id, month.parse()?))
    }
}

impl Serialize for LogKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for LogKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
