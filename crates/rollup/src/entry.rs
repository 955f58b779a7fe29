use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Label used when a record carries no category.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Anything the rollup functions can aggregate.
///
/// Implementations coerce their own raw values: `amount` must already be a
/// finite number (invalid input reads as `0.0`) and `date` is `None` when the
/// stored value cannot be read as a calendar date.
pub trait Entry {
    fn category(&self) -> Option<&str>;
    fn amount(&self) -> f64;
    fn date(&self) -> Option<NaiveDate>;
}

/// An entry from the combined ledger, where sales and expenses share one list.
pub trait LedgerEntry: Entry {
    fn kind(&self) -> RecordKind;
}

impl<T: Entry + ?Sized> Entry for &T {
    fn category(&self) -> Option<&str> {
        (**self).category()
    }

    fn amount(&self) -> f64 {
        (**self).amount()
    }

    fn date(&self) -> Option<NaiveDate> {
        (**self).date()
    }
}

impl<T: LedgerEntry + ?Sized> LedgerEntry for &T {
    fn kind(&self) -> RecordKind {
        (**self).kind()
    }
}

pub(crate) fn category_label<E: Entry>(entry: &E) -> &str {
    entry
        .category()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or(UNCATEGORIZED)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordKind {
    Sale,
    Expense,
}

impl RecordKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Sale => "Sale",
            RecordKind::Expense => "Expense",
        }
    }

    /// Lowercase noun for user-facing messages.
    pub fn noun(&self) -> &'static str {
        match self {
            RecordKind::Sale => "sale",
            RecordKind::Expense => "expense",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sale" | "sales" => Ok(RecordKind::Sale),
            "expense" | "expenses" => Ok(RecordKind::Expense),
            other => Err(format!("Unknown record kind: {}", other)),
        }
    }
}

/// Amount as it arrives from storage: a JSON number or a numeric string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawAmount {
    Number(f64),
    Text(String),
    Other(serde_json::Value),
}

impl RawAmount {
    pub fn coerce(&self) -> f64 {
        match self {
            RawAmount::Number(n) if n.is_finite() => *n,
            RawAmount::Text(s) => coerce_amount(s),
            _ => 0.0,
        }
    }
}

/// Blank text reads as zero; anything unparsable or non-finite reads as zero.
pub fn coerce_amount(raw: &str) -> f64 {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .unwrap_or(0.0)
}

/// Date as it arrives from storage: an ISO string or epoch milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawDate {
    EpochMillis(f64),
    Text(String),
}

impl RawDate {
    /// Epoch milliseconds resolve to their UTC calendar date; timestamps with an
    /// offset resolve to the calendar date in that offset.
    pub fn to_date(&self) -> Option<NaiveDate> {
        match self {
            RawDate::EpochMillis(ms) if ms.is_finite() => {
                DateTime::from_timestamp_millis(*ms as i64).map(|dt| dt.date_naive())
            }
            RawDate::EpochMillis(_) => None,
            RawDate::Text(s) => parse_date(s),
        }
    }
}

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local().date());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|dt| dt.date())
}

/// Loosely-typed record as mirrored by storage collaborators.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub amount: Option<RawAmount>,
    #[serde(default)]
    pub date: Option<RawDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment: Option<String>,
}

impl RawRecord {
    pub fn new(category: &str, amount: f64, date: &str) -> Self {
        Self {
            category: Some(category.to_string()),
            amount: Some(RawAmount::Number(amount)),
            date: Some(RawDate::Text(date.to_string())),
            ..Self::default()
        }
    }
}

impl Entry for RawRecord {
    fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    fn amount(&self) -> f64 {
        self.amount.as_ref().map(RawAmount::coerce).unwrap_or(0.0)
    }

    fn date(&self) -> Option<NaiveDate> {
        self.date.as_ref().and_then(RawDate::to_date)
    }
}
