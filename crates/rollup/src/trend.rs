use crate::calendar::MonthKey;
use crate::entry::Entry;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub month: MonthKey,
    pub label: String,
    pub sales: f64,
    pub expenses: f64,
    pub profit: f64,
}

fn bucket_into<E: Entry>(records: &[E], first: MonthKey, totals: &mut [f64]) {
    for record in records {
        let Some(date) = record.date() else { continue };
        let offset = MonthKey::from_date(date).ordinal() - first.ordinal();
        if let Ok(i) = usize::try_from(offset) {
            if let Some(slot) = totals.get_mut(i) {
                *slot += record.amount();
            }
        }
    }
}

/// Monthly sales, expenses and profit for the `months` months ending at
/// `end` (inclusive), oldest first. Records are bucketed by their own dates
/// in a single pass per side.
pub fn profit_trend<S: Entry, X: Entry>(sales: &[S], expenses: &[X], end: MonthKey, months: u32) -> Vec<TrendPoint> {
    if months == 0 {
        return Vec::new();
    }
    let first = end.offset(-(i64::from(months) - 1));
    let len = months as usize;

    let mut sales_by_month = vec![0.0; len];
    let mut expenses_by_month = vec![0.0; len];
    bucket_into(sales, first, &mut sales_by_month);
    bucket_into(expenses, first, &mut expenses_by_month);

    (0..len)
        .map(|i| {
            let month = first.offset(i as i64);
            TrendPoint {
                month,
                label: month.short_label(),
                sales: sales_by_month[i],
                expenses: expenses_by_month[i],
                profit: sales_by_month[i] - expenses_by_month[i],
            }
        })
        .collect()
}
