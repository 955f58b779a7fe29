use crate::models::{RawCreateRecordsRequest, RecordView};
use crate::service::{RecordError, RecordService};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use common::AppState;
use rollup::LedgerTotals;
use serde_json::json;
use std::sync::Arc;

impl IntoResponse for RecordError {
    fn into_response(self) -> Response {
        let (status, msg) = match self {
            RecordError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            RecordError::NotFound => (StatusCode::NOT_FOUND, "Record not found".to_string()),
            RecordError::Infrastructure(e) => {
                tracing::error!("record storage failure: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(json!({ "error": msg }))).into_response()
    }
}

pub fn records_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_records).post(create_records))
        .route("/summary", get(ledger_summary))
        .route("/{id}", get(get_record).delete(delete_record))
        .with_state(state)
}

async fn list_records(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<RecordView>>, RecordError> {
    let records = RecordService::list_records(&state.db).await?;
    Ok(Json(records.iter().map(RecordView::from).collect()))
}

async fn create_records(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RawCreateRecordsRequest>,
) -> Result<impl IntoResponse, RecordError> {
    let ids = RecordService::create_records(&state.db, &state.feed, payload).await?;
    Ok((StatusCode::CREATED, Json(json!({ "ids": ids }))))
}

async fn get_record(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<RecordView>, RecordError> {
    let record = RecordService::get_record(&state.db, id).await?;
    Ok(Json(RecordView::from(&record)))
}

async fn delete_record(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, RecordError> {
    RecordService::delete_record(&state.db, &state.feed, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn ledger_summary(
    State(state): State<Arc<AppState>>,
) -> Result<Json<LedgerTotals>, RecordError> {
    let totals = RecordService::ledger_totals(&state.db).await?;
    Ok(Json(totals))
}
