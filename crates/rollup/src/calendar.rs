use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

const MONTH_NAMES: [&str; 12] = [
    "January", "February", "March", "April", "May", "June",
    "July", "August", "September", "October", "November", "December",
];

/// Gregorian rule: divisible by 4, not by 100 unless also by 400.
pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Day count of a zero-based month. Indexes outside `0..=11` roll over into
/// neighbouring years.
pub fn days_in_month(year: i32, month_index: i32) -> u32 {
    MonthKey::normalized(year, month_index).days_in_month()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthBounds {
    pub start: NaiveDateTime,
    /// Last instant of the month (23:59:59.999 on its final day).
    pub end: NaiveDateTime,
    pub days_in_month: u32,
}

impl MonthBounds {
    pub fn contains(&self, at: NaiveDateTime) -> bool {
        at >= self.start && at <= self.end
    }

    pub fn contains_date(&self, date: NaiveDate) -> bool {
        self.contains(date.and_time(NaiveTime::MIN))
    }
}

pub fn month_bounds(year: i32, month_index: i32) -> MonthBounds {
    MonthKey::normalized(year, month_index).bounds()
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("Invalid month format. Expected YYYY-MM")]
pub struct MonthKeyError;

/// A calendar month, `month_index` zero-based (January = 0).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MonthKey {
    year: i32,
    month_index: u32,
}

impl MonthKey {
    pub fn new(year: i32, month_index: u32) -> Option<Self> {
        (month_index < 12).then_some(Self { year, month_index })
    }

    /// Rolls month indexes outside `0..=11` over into neighbouring years, the
    /// way `(2024, 12)` means January 2025.
    pub fn normalized(year: i32, month_index: i32) -> Self {
        Self::from_ordinal(i64::from(year) * 12 + i64::from(month_index))
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self { year: date.year(), month_index: date.month0() }
    }

    fn from_ordinal(ordinal: i64) -> Self {
        let year = ordinal.div_euclid(12);
        let year = i32::try_from(year).unwrap_or(if year < 0 { i32::MIN } else { i32::MAX });
        Self { year, month_index: ordinal.rem_euclid(12) as u32 }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month_index(&self) -> u32 {
        self.month_index
    }

    /// One-based month number.
    pub fn month(&self) -> u32 {
        self.month_index + 1
    }

    pub(crate) fn ordinal(&self) -> i64 {
        i64::from(self.year) * 12 + i64::from(self.month_index)
    }

    pub fn offset(&self, months: i64) -> Self {
        Self::from_ordinal(self.ordinal() + months)
    }

    pub fn previous(&self) -> Self {
        self.offset(-1)
    }

    pub fn days_in_month(&self) -> u32 {
        match self.month_index {
            1 if is_leap_year(self.year) => 29,
            1 => 28,
            3 | 5 | 8 | 10 => 30,
            _ => 31,
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month0() == self.month_index
    }

    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month(), 1)
    }

    pub fn last_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month(), self.days_in_month())
    }

    /// Saturates to chrono's representable range for years it cannot express.
    pub fn bounds(&self) -> MonthBounds {
        let saturated = if self.year < 0 { NaiveDate::MIN } else { NaiveDate::MAX };
        let first = self.first_day().unwrap_or(saturated);
        let last = self.last_day().unwrap_or(saturated);

        MonthBounds {
            start: first.and_time(NaiveTime::MIN),
            end: last
                .and_hms_milli_opt(23, 59, 59, 999)
                .unwrap_or(NaiveDateTime::MAX),
            days_in_month: self.days_in_month(),
        }
    }

    /// `"Feb 2024"`
    pub fn short_label(&self) -> String {
        format!("{} {}", &MONTH_NAMES[self.month_index as usize][..3], self.year)
    }

    /// `"February 2024"`
    pub fn long_label(&self) -> String {
        format!("{} {}", MONTH_NAMES[self.month_index as usize], self.year)
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month())
    }
}

impl FromStr for MonthKey {
    type Err = MonthKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (year, month) = s.trim().rsplit_once('-').ok_or(MonthKeyError)?;
        if month.len() != 2 {
            return Err(MonthKeyError);
        }
        let year: i32 = year.parse().map_err(|_| MonthKeyError)?;
        let month: u32 = month.parse().map_err(|_| MonthKeyError)?;
        if !(1..=12).contains(&month) {
            return Err(MonthKeyError);
        }
        Ok(Self { year, month_index: month - 1 })
    }
}

impl Serialize for MonthKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MonthKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
