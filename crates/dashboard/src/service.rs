use crate::models::{DashboardSnapshot, MonthlyDashboard, ProfitDashboard, TREND_MONTHS};
use database::Database;
use records::models::{Record, RecordView};
use records::service::{RecordError, RecordService};
use rollup::calendar::MonthKeyError;
use rollup::{Entry, MonthKey, RecordKind, compute_monthly_summary, compute_profit_summary, profit_trend};
use tracing::instrument;

#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error(transparent)]
    InvalidMonth(#[from] MonthKeyError),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("No data to export")]
    NothingToExport,
    #[error("Database error: {0}")]
    Infrastructure(String),
}

impl From<RecordError> for DashboardError {
    fn from(err: RecordError) -> Self {
        match err {
            RecordError::InvalidInput(msg) => DashboardError::InvalidInput(msg),
            RecordError::Infrastructure(msg) => DashboardError::Infrastructure(msg),
            RecordError::NotFound => DashboardError::Infrastructure(err.to_string()),
        }
    }
}

fn window(month: MonthKey) -> (i32, i32) {
    (month.year(), month.month_index() as i32)
}

fn in_month(records: &[Record], month: MonthKey) -> Vec<&Record> {
    records
        .iter()
        .filter(|r| r.date().is_some_and(|d| month.contains(d)))
        .collect()
}

pub struct DashboardService;

impl DashboardService {
    #[instrument(skip(db))]
    pub async fn monthly(
        db: &Database,
        kind: RecordKind,
        month: MonthKey,
    ) -> Result<MonthlyDashboard, DashboardError> {
        let records = RecordService::list_month(db, kind, month).await?;
        let (year, month_index) = window(month);

        Ok(MonthlyDashboard {
            month,
            label: month.long_label(),
            summary: compute_monthly_summary(&records, year, month_index),
            records: records.iter().map(RecordView::from).collect(),
        })
    }

    /// Loads both sides of the ledger once for the whole trend span; the
    /// month summary is taken from the same rows.
    #[instrument(skip(db))]
    pub async fn profit(db: &Database, month: MonthKey) -> Result<ProfitDashboard, DashboardError> {
        let first = month.offset(-i64::from(TREND_MONTHS - 1));
        let sales = RecordService::list_months(db, RecordKind::Sale, first, month).await?;
        let expenses = RecordService::list_months(db, RecordKind::Expense, first, month).await?;

        let summary = compute_profit_summary(&in_month(&sales, month), &in_month(&expenses, month));

        Ok(ProfitDashboard {
            month,
            label: month.long_label(),
            ranked: summary.ranked(),
            overview: summary.overview(),
            trend: profit_trend(&sales, &expenses, month, TREND_MONTHS),
            summary,
        })
    }

    #[instrument(skip(db))]
    pub async fn snapshot(db: &Database, month: MonthKey) -> Result<DashboardSnapshot, DashboardError> {
        let sales = RecordService::list_month(db, RecordKind::Sale, month).await?;
        let expenses = RecordService::list_month(db, RecordKind::Expense, month).await?;
        let (year, month_index) = window(month);

        let profit = compute_profit_summary(&sales, &expenses);
        Ok(DashboardSnapshot {
            month,
            label: month.long_label(),
            sales: compute_monthly_summary(&sales, year, month_index),
            expenses: compute_monthly_summary(&expenses, year, month_index),
            overview: profit.overview(),
            profit,
        })
    }

    /// Month records in listing order, for export.
    pub async fn month_records(
        db: &Database,
        kind: RecordKind,
        month: MonthKey,
    ) -> Result<Vec<Record>, DashboardError> {
        Ok(RecordService::list_month(db, kind, month).await?)
    }
}
