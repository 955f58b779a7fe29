//! Rollup engine: turns dated, categorized money records into the monthly,
//! per-category and profit views the dashboards render.
//!
//! Every function here is pure. Callers recompute from scratch whenever the
//! underlying record set changes.

pub mod calendar;
pub mod category;
pub mod entry;
pub mod profit;
pub mod summary;
pub mod totals;
pub mod trend;

pub use calendar::{MonthBounds, MonthKey, days_in_month, is_leap_year, month_bounds};
pub use category::CategoryTotals;
pub use entry::{Entry, LedgerEntry, RawAmount, RawDate, RawRecord, RecordKind, UNCATEGORIZED};
pub use profit::{CategoryProfit, ProfitOverview, ProfitSummary, RankedProfit, compute_profit_summary};
pub use summary::{MonthlySummary, NO_CATEGORY, compute_monthly_summary};
pub use totals::{LedgerTotals, compute_ledger_totals};
pub use trend::{TrendPoint, profit_trend};
