use records::models::RecordView;
use rollup::{MonthKey, MonthlySummary, ProfitOverview, ProfitSummary, RankedProfit, TrendPoint};
use serde::Serialize;

/// Months shown in the profit trend, ending at the selected month.
pub const TREND_MONTHS: u32 = 6;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyDashboard {
    pub month: MonthKey,
    pub label: String,
    pub summary: MonthlySummary,
    pub records: Vec<RecordView>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfitDashboard {
    pub month: MonthKey,
    pub label: String,
    pub summary: ProfitSummary,
    pub ranked: Vec<RankedProfit>,
    pub overview: ProfitOverview,
    pub trend: Vec<TrendPoint>,
}

/// Everything the live view renders for one month, computed in one pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    pub month: MonthKey,
    pub label: String,
    pub sales: MonthlySummary,
    pub expenses: MonthlySummary,
    pub profit: ProfitSummary,
    pub overview: ProfitOverview,
}
