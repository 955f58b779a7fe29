use chrono::NaiveDate;
use rollup::{Entry, LedgerEntry, RawAmount, RecordKind};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Line items accepted in one submission.
pub const MAX_LINE_ITEMS: usize = 4;

#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub id: i64,
    pub kind: RecordKind,
    pub category: String,
    pub amount: i64,         // Cents
    pub payment: String,
    pub record_date: String, // 'YYYY-MM-DD'
    pub notes: Option<String>,
    pub created_at: i64,     // Epoch milliseconds
}

impl Record {
    pub fn amount_dollars(&self) -> f64 {
        self.amount as f64 / 100.0
    }
}

impl Entry for Record {
    fn category(&self) -> Option<&str> {
        Some(&self.category)
    }

    fn amount(&self) -> f64 {
        self.amount_dollars()
    }

    fn date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.record_date, "%Y-%m-%d").ok()
    }
}

impl LedgerEntry for Record {
    fn kind(&self) -> RecordKind {
        self.kind
    }
}

/// Wire shape of a record: amounts in currency units, notes never null.
#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecordView {
    pub id: i64,
    pub kind: RecordKind,
    pub category: String,
    pub amount: f64,
    pub payment: String,
    pub date: String,
    pub notes: String,
    pub created_at: i64,
}

impl From<&Record> for RecordView {
    fn from(record: &Record) -> Self {
        RecordView {
            id: record.id,
            kind: record.kind,
            category: record.category.clone(),
            amount: record.amount_dollars(),
            payment: record.payment.clone(),
            date: record.record_date.clone(),
            notes: record.notes.clone().unwrap_or_default(),
            created_at: record.created_at,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct RawLineItem {
    #[validate(length(max = 64, message = "Category name is too long"))]
    pub category: String,
    pub amount: Option<RawAmount>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RawCreateRecordsRequest {
    pub kind: RecordKind,
    #[serde(default)]
    #[validate(length(max = 64, message = "Payment method is too long"))]
    pub payment: String,
    pub date: String,
    #[serde(default)]
    #[validate(length(max = 500, message = "Notes are too long"))]
    pub notes: Option<String>,
    #[validate(nested)]
    pub items: Vec<RawLineItem>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineItem {
    category: String,
    amount: i64, // Cents
}

impl LineItem {
    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn amount(&self) -> i64 {
        self.amount
    }
}

/// A checked batch of line items sharing one kind, date, payment method and
/// note. Only constructible through [`CreateRecordsRequest::new`].
#[derive(Debug)]
pub struct CreateRecordsRequest {
    kind: RecordKind,
    payment: String,
    record_date: String,
    notes: Option<String>,
    items: Vec<LineItem>,
}

impl CreateRecordsRequest {
    pub fn new(
        kind: RecordKind,
        payment: String,
        record_date: String,
        notes: Option<String>,
        items: Vec<(String, f64)>,
    ) -> Result<Self, String> {
        let mut lines = Vec::with_capacity(items.len());
        for (category, dollars) in items {
            if let Some(cents) = to_cents(dollars)? {
                lines.push((category, cents));
            }
        }
        let items = lines;

        if items.is_empty() {
            return Err(format!(
                "Please enter at least one {} line with amount > 0",
                kind.noun()
            ));
        }
        if items.len() > MAX_LINE_ITEMS {
            return Err(format!(
                "Maximum {} {} lines per submission",
                MAX_LINE_ITEMS,
                kind.noun()
            ));
        }

        let record_date = record_date.trim().to_string();
        if NaiveDate::parse_from_str(&record_date, "%Y-%m-%d").is_err() {
            return Err("Invalid date format, expected YYYY-MM-DD".to_string());
        }

        let items = items
            .into_iter()
            .map(|(category, amount)| {
                let category = category.trim().to_string();
                if category.is_empty() {
                    return Err("Category is required".to_string());
                }
                Ok(LineItem { category, amount })
            })
            .collect::<Result<Vec<_>, String>>()?;

        let notes = notes
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());

        Ok(Self {
            kind,
            payment: payment.trim().to_string(),
            record_date,
            notes,
            items,
        })
    }

    pub fn from_raw(raw: RawCreateRecordsRequest) -> Result<Self, String> {
        let items = raw
            .items
            .into_iter()
            .map(|item| {
                let amount = item.amount.as_ref().map(RawAmount::coerce).unwrap_or(0.0);
                (item.category, amount)
            })
            .collect();
        Self::new(raw.kind, raw.payment, raw.date, raw.notes, items)
    }

    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    pub fn payment(&self) -> &str {
        &self.payment
    }

    pub fn record_date(&self) -> &str {
        &self.record_date
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }
}

/// Rounds a currency amount to whole cents. Lines that round to nothing or
/// less are skipped (`None`); amounts too large to store are rejected.
fn to_cents(dollars: f64) -> Result<Option<i64>, String> {
    if dollars.is_nan() {
        return Ok(None);
    }
    let cents = (dollars * 100.0).round();
    if cents <= 0.0 {
        return Ok(None);
    }
    // i64::MAX as f64 rounds up to 2^63, which is itself out of range.
    if !cents.is_finite() || cents >= i64::MAX as f64 {
        return Err("Amount is too large".to_string());
    }
    Ok(Some(cents as i64))
}
