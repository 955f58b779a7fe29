use crate::controller::DashboardController;
use crate::export::{self, CSV_CONTENT_TYPE};
use crate::models::{DashboardSnapshot, MonthlyDashboard, ProfitDashboard};
use crate::service::{DashboardError, DashboardService};
use axum::{
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use database::Database;
use rollup::{MonthKey, RecordKind};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

impl IntoResponse for DashboardError {
    fn into_response(self) -> Response {
        let status = match &self {
            DashboardError::InvalidMonth(_) | DashboardError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            DashboardError::NothingToExport => StatusCode::NOT_FOUND,
            DashboardError::Infrastructure(e) => {
                tracing::error!("dashboard storage failure: {}", e);
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Internal server error" })),
                )
                    .into_response();
            }
        };

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[derive(Clone)]
pub struct DashboardState {
    pub db: Database,
    pub controller: Arc<DashboardController>,
}

pub fn dashboard_router<S>(state: DashboardState) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/live", get(live_snapshot).put(select_live_month))
        .route("/sales/{month}", get(sales_dashboard))
        .route("/sales/{month}/export", get(export_sales))
        .route("/expenses/{month}", get(expenses_dashboard))
        .route("/expenses/{month}/export", get(export_expenses))
        .route("/profit/{month}", get(profit_dashboard))
        .route("/profit/{month}/export", get(export_profit))
        .with_state(state)
}

#[derive(Deserialize)]
struct SelectMonth {
    month: String,
}

fn csv_response(file_name: &str, body: String) -> Response {
    (
        [
            (header::CONTENT_TYPE, CSV_CONTENT_TYPE.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file_name),
            ),
        ],
        body,
    )
        .into_response()
}

async fn live_snapshot(State(state): State<DashboardState>) -> Result<Json<DashboardSnapshot>, DashboardError> {
    match state.controller.snapshot().await {
        Some(snapshot) => Ok(Json(snapshot)),
        None => Ok(Json(state.controller.refresh().await?)),
    }
}

async fn select_live_month(
    State(state): State<DashboardState>,
    Json(body): Json<SelectMonth>,
) -> Result<Json<DashboardSnapshot>, DashboardError> {
    let month: MonthKey = body.month.parse()?;
    Ok(Json(state.controller.select_month(month).await?))
}

async fn monthly(db: &Database, kind: RecordKind, month: &str) -> Result<Json<MonthlyDashboard>, DashboardError> {
    let month: MonthKey = month.parse()?;
    Ok(Json(DashboardService::monthly(db, kind, month).await?))
}

async fn sales_dashboard(
    State(state): State<DashboardState>,
    Path(month): Path<String>,
) -> Result<Json<MonthlyDashboard>, DashboardError> {
    monthly(&state.db, RecordKind::Sale, &month).await
}

async fn expenses_dashboard(
    State(state): State<DashboardState>,
    Path(month): Path<String>,
) -> Result<Json<MonthlyDashboard>, DashboardError> {
    monthly(&state.db, RecordKind::Expense, &month).await
}

async fn profit_dashboard(
    State(state): State<DashboardState>,
    Path(month): Path<String>,
) -> Result<Json<ProfitDashboard>, DashboardError> {
    let month: MonthKey = month.parse()?;
    Ok(Json(DashboardService::profit(&state.db, month).await?))
}

async fn export_records(db: &Database, kind: RecordKind, month: &str) -> Result<Response, DashboardError> {
    let month: MonthKey = month.parse()?;
    let records = DashboardService::month_records(db, kind, month).await?;
    let csv = export::records_csv(kind, &records).ok_or(DashboardError::NothingToExport)?;

    tracing::info!(%kind, %month, rows = records.len(), "csv export");
    Ok(csv_response(export::records_file_name(kind), csv))
}

async fn export_sales(
    State(state): State<DashboardState>,
    Path(month): Path<String>,
) -> Result<Response, DashboardError> {
    export_records(&state.db, RecordKind::Sale, &month).await
}

async fn export_expenses(
    State(state): State<DashboardState>,
    Path(month): Path<String>,
) -> Result<Response, DashboardError> {
    export_records(&state.db, RecordKind::Expense, &month).await
}

async fn export_profit(
    State(state): State<DashboardState>,
    Path(month): Path<String>,
) -> Result<Response, DashboardError> {
    let month: MonthKey = month.parse()?;
    let view = DashboardService::profit(&state.db, month).await?;
    let csv = export::profit_csv(month, &view.summary).ok_or(DashboardError::NothingToExport)?;

    Ok(csv_response(&export::profit_file_name(month), csv))
}
