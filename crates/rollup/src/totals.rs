use crate::entry::{LedgerEntry, RecordKind};
use serde::Serialize;

/// Whole-ledger figures for the summary cards above the record table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerTotals {
    pub sales: f64,
    pub expenses: f64,
    pub profit: f64,
    pub record_count: usize,
}

pub fn compute_ledger_totals<E: LedgerEntry>(records: &[E]) -> LedgerTotals {
    let mut totals = LedgerTotals::default();
    for record in records {
        match record.kind() {
            RecordKind::Sale => totals.sales += record.amount(),
            RecordKind::Expense => totals.expenses += record.amount(),
        }
    }
    totals.profit = totals.sales - totals.expenses;
    totals.record_count = records.len();
    totals
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{Entry, RawRecord};
    use chrono::NaiveDate;

    struct Tagged(RecordKind, RawRecord);

    impl Entry for Tagged {
        fn category(&self) -> Option<&str> {
            self.1.category()
        }
        fn amount(&self) -> f64 {
            self.1.amount()
        }
        fn date(&self) -> Option<NaiveDate> {
            self.1.date()
        }
    }

    impl LedgerEntry for Tagged {
        fn kind(&self) -> RecordKind {
            self.0
        }
    }

    #[test]
    fn test_splits_by_kind() {
        let records = vec![
            Tagged(RecordKind::Sale, RawRecord::new("Retail", 300.0, "2024-01-02")),
            Tagged(RecordKind::Expense, RawRecord::new("Rent", 120.0, "2024-01-03")),
            Tagged(RecordKind::Sale, RawRecord::new("Services", 20.0, "2023-12-30")),
        ];
        let totals = compute_ledger_totals(&records);
        assert_eq!(totals.sales, 320.0);
        assert_eq!(totals.expenses, 120.0);
        assert_eq!(totals.profit, 200.0);
        assert_eq!(totals.record_count, 3);
    }

    #[test]
    fn test_empty_ledger() {
        assert_eq!(compute_ledger_totals::<Tagged>(&[]), LedgerTotals::default());
    }
}
