use crate::category::CategoryTotals;
use crate::entry::{Entry, category_label};
use serde::Serialize;
use serde::ser::{SerializeMap, Serializer};

/// `profit / sales * 100`, or zero when there were no sales.
pub fn margin(profit: f64, sales: f64) -> f64 {
    if sales > 0.0 { profit / sales * 100.0 } else { 0.0 }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CategoryProfit {
    pub sales: f64,
    pub expenses: f64,
    pub profit: f64,
    pub margin: f64,
}

impl CategoryProfit {
    pub fn new(sales: f64, expenses: f64) -> Self {
        let profit = sales - expenses;
        Self { sales, expenses, profit, margin: margin(profit, sales) }
    }
}

/// Per-category profit, ordered by first appearance across the sales scan
/// and then the expense scan.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfitSummary {
    lines: Vec<(String, CategoryProfit)>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedProfit {
    pub category: String,
    #[serde(flatten)]
    pub line: CategoryProfit,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfitOverview {
    pub total_sales: f64,
    pub total_expenses: f64,
    pub total_profit: f64,
    pub overall_margin: f64,
    pub top_category: Option<RankedProfit>,
    pub low_category: Option<RankedProfit>,
    pub category_count: usize,
}

impl ProfitSummary {
    pub fn get(&self, category: &str) -> Option<&CategoryProfit> {
        self.lines.iter().find(|(c, _)| c == category).map(|(_, line)| line)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CategoryProfit)> {
        self.lines.iter().map(|(c, line)| (c.as_str(), line))
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn total_sales(&self) -> f64 {
        self.lines.iter().map(|(_, l)| l.sales).sum()
    }

    pub fn total_expenses(&self) -> f64 {
        self.lines.iter().map(|(_, l)| l.expenses).sum()
    }

    pub fn total_profit(&self) -> f64 {
        self.lines.iter().map(|(_, l)| l.profit).sum()
    }

    pub fn overall_margin(&self) -> f64 {
        margin(self.total_profit(), self.total_sales())
    }

    /// Descending profit; equal profits keep summary order.
    pub fn ranked(&self) -> Vec<RankedProfit> {
        let mut ranked: Vec<RankedProfit> = self
            .lines
            .iter()
            .map(|(category, line)| RankedProfit { category: category.clone(), line: *line })
            .collect();
        ranked.sort_by(|a, b| b.line.profit.total_cmp(&a.line.profit));
        ranked
    }

    pub fn overview(&self) -> ProfitOverview {
        let ranked = self.ranked();
        ProfitOverview {
            total_sales: self.total_sales(),
            total_expenses: self.total_expenses(),
            total_profit: self.total_profit(),
            overall_margin: self.overall_margin(),
            top_category: ranked.first().cloned(),
            low_category: ranked.last().cloned(),
            category_count: ranked.len(),
        }
    }
}

impl Serialize for ProfitSummary {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.lines.len()))?;
        for (category, line) in &self.lines {
            map.serialize_entry(category, line)?;
        }
        map.end()
    }
}

fn totals_by_category<E: Entry>(records: &[E]) -> CategoryTotals {
    let mut totals = CategoryTotals::new();
    for record in records {
        totals.add(category_label(record), record.amount());
    }
    totals
}

/// Joins sales and expenses per category. Both inputs are expected to be
/// scoped to the same month already; dates are not consulted.
pub fn compute_profit_summary<S: Entry, X: Entry>(sales: &[S], expenses: &[X]) -> ProfitSummary {
    let sales = totals_by_category(sales);
    let expenses = totals_by_category(expenses);

    let mut lines: Vec<(String, CategoryProfit)> = sales
        .iter()
        .map(|(category, amount)| {
            let spent = expenses.get(category).unwrap_or(0.0);
            (category.to_string(), CategoryProfit::new(amount, spent))
        })
        .collect();

    lines.extend(
        expenses
            .iter()
            .filter(|(category, _)| sales.get(category).is_none())
            .map(|(category, spent)| (category.to_string(), CategoryProfit::new(0.0, spent))),
    );

    ProfitSummary { lines }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{RawAmount, RawRecord};

    fn rec(category: &str, amount: f64) -> RawRecord {
        RawRecord::new(category, amount, "2024-02-10")
    }

    #[test]
    fn test_union_of_categories() {
        let sales = vec![rec("Food", 230.0), rec("Beverage", 120.0), rec("Food", 180.0)];
        let expenses = vec![rec("Food", 45.5), rec("Rent", 1200.0)];

        let summary = compute_profit_summary(&sales, &expenses);

        let keys: Vec<_> = summary.iter().map(|(c, _)| c).collect();
        assert_eq!(keys, vec!["Food", "Beverage", "Rent"]);

        let food = summary.get("Food").unwrap();
        assert_eq!(food.sales, 410.0);
        assert_eq!(food.expenses, 45.5);
        assert_eq!(food.profit, 364.5);
        assert!((food.margin - 364.5 / 410.0 * 100.0).abs() < 1e-9);

        let rent = summary.get("Rent").unwrap();
        assert_eq!(rent.sales, 0.0);
        assert_eq!(rent.profit, -1200.0);
        assert_eq!(rent.margin, 0.0);

        let beverage = summary.get("Beverage").unwrap();
        assert_eq!(beverage.expenses, 0.0);
        assert_eq!(beverage.margin, 100.0);
    }

    #[test]
    fn test_profit_invariants_hold() {
        let sales = vec![rec("A", 10.0), rec("B", 0.0), rec("C", 7.5)];
        let expenses = vec![rec("B", 3.0), rec("C", 9.0), rec("D", 1.0)];
        let summary = compute_profit_summary(&sales, &expenses);

        assert_eq!(summary.len(), 4);
        for (_, line) in summary.iter() {
            assert_eq!(line.profit, line.sales - line.expenses);
            let expected = if line.sales > 0.0 { line.profit / line.sales * 100.0 } else { 0.0 };
            assert_eq!(line.margin, expected);
        }
    }

    #[test]
    fn test_missing_category_and_bad_amount() {
        let mut unnamed = rec("", 50.0);
        unnamed.category = None;
        let mut bad = rec("Food", 0.0);
        bad.amount = Some(RawAmount::Text("oops".into()));

        let summary = compute_profit_summary(&[unnamed], &[bad]);
        assert_eq!(summary.get("Uncategorized").unwrap().sales, 50.0);
        assert_eq!(summary.get("Food").unwrap().expenses, 0.0);
    }

    #[test]
    fn test_ranking_and_overview() {
        let sales = vec![rec("Low", 10.0), rec("High", 500.0), rec("Tie", 40.0)];
        let expenses = vec![rec("Low", 50.0), rec("Tie", 0.0), rec("Other", 0.0)];
        let summary = compute_profit_summary(&sales, &expenses);

        let ranked: Vec<_> = summary.ranked().into_iter().map(|r| r.category).collect();
        assert_eq!(ranked, vec!["High", "Tie", "Other", "Low"]);

        let overview = summary.overview();
        assert_eq!(overview.total_sales, 550.0);
        assert_eq!(overview.total_expenses, 50.0);
        assert_eq!(overview.total_profit, 500.0);
        assert!((overview.overall_margin - 500.0 / 550.0 * 100.0).abs() < 1e-9);
        assert_eq!(overview.top_category.unwrap().category, "High");
        assert_eq!(overview.low_category.unwrap().category, "Low");
        assert_eq!(overview.category_count, 4);
    }

    #[test]
    fn test_empty_overview() {
        let summary = compute_profit_summary::<RawRecord, RawRecord>(&[], &[]);
        let overview = summary.overview();
        assert!(summary.is_empty());
        assert_eq!(overview.total_profit, 0.0);
        assert_eq!(overview.overall_margin, 0.0);
        assert!(overview.top_category.is_none());
        assert!(overview.low_category.is_none());
    }

    #[test]
    fn test_serializes_in_summary_order() {
        let summary = compute_profit_summary(&[rec("B", 2.0)], &[rec("A", 1.0)]);
        let json = serde_json::to_string(&summary).unwrap();
        assert!(json.starts_with(r#"{"B":{"sales":2.0,"expenses":0.0,"profit":2.0,"margin":100.0}"#));
        assert!(json.contains(r#""A":{"sales":0.0,"expenses":1.0,"profit":-1.0,"margin":0.0}"#));
    }
}
