use crate::calendar::MonthKey;
use crate::category::CategoryTotals;
use crate::entry::{Entry, category_label};
use chrono::Datelike;
use serde::Serialize;
use std::collections::BTreeSet;

/// Shown as the top category when a month has no records.
pub const NO_CATEGORY: &str = "—";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlySummary {
    pub year: i32,
    pub month_index: u32,
    pub total: f64,
    /// One slot per day of the month; index `i` holds day `i + 1`.
    pub by_day: Vec<f64>,
    pub by_category: CategoryTotals,
    pub active_days: BTreeSet<u32>,
    pub average_per_active_day: f64,
    pub top_category: String,
}

impl MonthlySummary {
    pub fn month(&self) -> MonthKey {
        MonthKey::normalized(self.year, self.month_index as i32)
    }

    pub fn is_empty(&self) -> bool {
        self.active_days.is_empty()
    }
}

/// Rolls `records` up into per-day and per-category totals for one month.
///
/// Each record's day is taken from its own date, so the input does not need
/// to be sorted or pre-filtered: records dated outside the month, or with no
/// readable date, are left out.
pub fn compute_monthly_summary<E: Entry>(records: &[E], year: i32, month_index: i32) -> MonthlySummary {
    let month = MonthKey::normalized(year, month_index);
    let mut by_day = vec![0.0; month.days_in_month() as usize];
    let mut by_category = CategoryTotals::new();
    let mut active_days = BTreeSet::new();
    let mut total = 0.0;

    for record in records {
        let Some(date) = record.date().filter(|d| month.contains(*d)) else {
            tracing::trace!(window = %month, "skipping entry outside window");
            continue;
        };

        let day = date.day();
        let amount = record.amount();

        by_day[(day - 1) as usize] += amount;
        total += amount;
        by_category.add(category_label(record), amount);
        active_days.insert(day);
    }

    let average_per_active_day = if active_days.is_empty() {
        0.0
    } else {
        total / active_days.len() as f64
    };

    let top_category = by_category.top().unwrap_or(NO_CATEGORY).to_string();

    MonthlySummary {
        year: month.year(),
        month_index: month.month_index(),
        total,
        by_day,
        by_category,
        active_days,
        average_per_active_day,
        top_category,
    }
}
