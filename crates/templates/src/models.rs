use chrono::NaiveDate;
use rollup::RawDate;
use serde::Deserialize;
use serde_json::{Map, Value};

pub const DAILY_DATA_FILE: &str = "daily-data.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateKind {
    Expense,
    Salary,
    BankExpense,
}

impl TemplateKind {
    pub const ALL: [TemplateKind; 3] = [
        TemplateKind::Expense,
        TemplateKind::Salary,
        TemplateKind::BankExpense,
    ];

    pub fn file_name(&self) -> &'static str {
        match self {
            TemplateKind::Expense => "expenses.json",
            TemplateKind::Salary => "salaries.json",
            TemplateKind::BankExpense => "bank-expenses.json",
        }
    }

    /// URL segment the list is mounted under.
    pub fn path(&self) -> &'static str {
        match self {
            TemplateKind::Expense => "/expenses",
            TemplateKind::Salary => "/salaries",
            TemplateKind::BankExpense => "/bank-expenses",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TemplateKind::Expense => "Expense",
            TemplateKind::Salary => "Salary",
            TemplateKind::BankExpense => "Bank expense",
        }
    }

    /// JSON key the updated list is returned under after a mutation.
    pub fn key(&self) -> &'static str {
        match self {
            TemplateKind::Expense => "expenses",
            TemplateKind::Salary => "salaries",
            TemplateKind::BankExpense => "bankExpenses",
        }
    }
}

/// Body of a template POST. `name` stays loose so a non-string is reported
/// as a missing name rather than a rejected body.
#[derive(Debug, Default, Deserialize)]
pub struct NewTemplate {
    #[serde(default)]
    pub name: Option<Value>,
}

impl NewTemplate {
    pub fn trimmed_name(&self) -> Option<&str> {
        match &self.name {
            Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim()),
            _ => None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// A daily snapshot is free-form; only `date` and `timestamp` are interpreted.
pub type DailyEntry = Map<String, Value>;

pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

pub(crate) fn entry_date(entry: &DailyEntry) -> Option<NaiveDate> {
    let raw: RawDate = serde_json::from_value(entry.get("date")?.clone()).ok()?;
    raw.to_date()
}
