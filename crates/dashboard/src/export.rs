//! CSV renderings of the dashboards.
//!
//! Quoting is narrower than RFC 4180: a free-text field is wrapped in quotes
//! only when it contains a double quote, and commas are never escaped.

use records::models::Record;
use rollup::{MonthKey, ProfitSummary, RecordKind};
use std::borrow::Cow;

pub const CSV_CONTENT_TYPE: &str = "text/csv; charset=utf-8";

pub fn csv_field(value: &str) -> Cow<'_, str> {
    if value.contains('"') {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(value)
    }
}

/// Shortest round-trip form, with negative zero printed as `0`.
pub fn csv_number(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    value.to_string()
}

fn percent(value: f64) -> String {
    // Adding zero folds -0.0 into 0.0.
    format!("{:.1}%", value + 0.0)
}

pub fn records_file_name(kind: RecordKind) -> &'static str {
    match kind {
        RecordKind::Sale => "sales.csv",
        RecordKind::Expense => "expenses.csv",
    }
}

pub fn profit_file_name(month: MonthKey) -> String {
    format!("profit-analysis-{}.csv", month)
}

/// One row per record in the order given. `None` when there is nothing to export.
pub fn records_csv(kind: RecordKind, records: &[Record]) -> Option<String> {
    if records.is_empty() {
        return None;
    }

    let header = match kind {
        RecordKind::Sale => "category,amount,date,payment",
        RecordKind::Expense => "category,amount,date,notes",
    };

    let mut lines = Vec::with_capacity(records.len() + 1);
    lines.push(header.to_string());
    for record in records {
        let last = match kind {
            RecordKind::Sale => record.payment.as_str(),
            RecordKind::Expense => record.notes.as_deref().unwrap_or_default(),
        };
        lines.push(format!(
            "{},{},{},{}",
            csv_field(&record.category),
            csv_number(record.amount_dollars()),
            record.record_date,
            csv_field(last),
        ));
    }

    Some(lines.join("\n"))
}

pub fn profit_csv(month: MonthKey, summary: &ProfitSummary) -> Option<String> {
    if summary.is_empty() {
        return None;
    }

    let mut csv = format!("Profit Analysis - {}\n\n", month.long_label());
    csv.push_str("Category,Sales,Expenses,Net Profit,Profit Margin\n");
    for (category, line) in summary.iter() {
        csv.push_str(&format!(
            "{},{},{},{},{}\n",
            csv_field(category),
            csv_number(line.sales),
            csv_number(line.expenses),
            csv_number(line.profit),
            percent(line.margin),
        ));
    }

    csv.push_str(&format!(
        "\nTOTAL,{},{},{},{}\n",
        csv_number(summary.total_sales()),
        csv_number(summary.total_expenses()),
        csv_number(summary.total_profit()),
        percent(summary.overall_margin()),
    ));

    Some(csv)
}
