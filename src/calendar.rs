use chrono::{Datelike, Duration, Months, NaiveDate};
use std::fmt;
use std::str::FromStr;

use crate::error::CalendarError;

/// Number of days in `month` of `year`.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => {
            if NaiveDate::from_ymd_opt(year, 2, 29).is_some() {
                29
            } else {
                28
            }
        }
        _ => 0,
    }
}

/// Strict `YYYY-MM-DD` parse; `None` for anything else.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()
}

/// `date` moved forward by `months` calendar months. When the day of month
/// does not exist in the resulting month it is clamped to that month's last
/// day (Jan 31 + 1 month = Feb 28/29).
pub fn add_months_clamped(date: NaiveDate, months: u32) -> Option<NaiveDate> {
    let target = YearMonth::of(date).offset(i64::from(months))?;
    Some(target.day_clamped(date.day()))
}

/// A calendar month, the unit every projection and summary is keyed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth(NaiveDate);

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Result<Self, CalendarError> {
        NaiveDate::from_ymd_opt(year, month, 1)
            .map(Self)
            .ok_or_else(|| CalendarError::InvalidMonth(format!("{year:04}-{month:02}")))
    }

    pub fn of(date: NaiveDate) -> Self {
        Self(date - Duration::days(i64::from(date.day0())))
    }

    pub fn year(self) -> i32 {
        self.0.year()
    }

    pub fn month(self) -> u32 {
        self.0.month()
    }

    pub fn days(self) -> u32 {
        days_in_month(self.year(), self.month())
    }

    pub fn first_day(self) -> NaiveDate {
        self.0
    }

    pub fn last_day(self) -> NaiveDate {
        self.day_clamped(31)
    }

    /// The date with day-of-month `min(day, days in month)`; day 0 is read as 1.
    pub fn day_clamped(self, day: u32) -> NaiveDate {
        let day = day.clamp(1, self.days());
        self.0 + Duration::days(i64::from(day - 1))
    }

    pub fn contains(self, date: NaiveDate) -> bool {
        Self::of(date) == self
    }

    /// Shift by a signed number of months; `None` past chrono's date range.
    pub fn offset(self, months: i64) -> Option<Self> {
        let step = Months::new(u32::try_from(months.unsigned_abs()).ok()?);
        let shifted = if months >= 0 {
            self.0.checked_add_months(step)
        } else {
            self.0.checked_sub_months(step)
        };
        shifted.map(Self)
    }

    pub fn succ(self) -> Self {
        self.offset(1).unwrap_or(self)
    }

    pub fn pred(self) -> Self {
        self.offset(-1).unwrap_or(self)
    }

    /// Signed number of months from `self` to `other`.
    pub fn months_until(self, other: YearMonth) -> i64 {
        let years = i64::from(other.year()) - i64::from(self.year());
        years * 12 + i64::from(other.month()) - i64::from(self.month())
    }

    /// Inclusive range of months from `self` to `end`; empty when `end` precedes `self`.
    pub fn through(self, end: YearMonth) -> Vec<YearMonth> {
        let mut months = Vec::new();
        let mut current = self;
        while current <= end {
            months.push(current);
            match current.offset(1) {
                Some(next) => current = next,
                None => break,
            }
        }
        months
    }

    /// `YYYY-MM` key used for month buckets.
    pub fn key(self) -> String {
        self.to_string()
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

impl FromStr for YearMonth {
    type Err = CalendarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        NaiveDate::parse_from_str(&format!("{trimmed}-01"), "%Y-%m-%d")
            .map(Self)
            .map_err(|_| CalendarError::InvalidMonth(trimmed.to_string()))
    }
}

#[cfg(test)]
#[path = "calendar_tests.rs"]
mod tests;
