use crate::models::{DailyEntry, DateRange, NewTemplate, TemplateKind};
use crate::service::{TemplateError, TemplateStore};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get},
    Json, Router,
};
use serde_json::{Value, json};
use std::sync::Arc;

impl IntoResponse for TemplateError {
    fn into_response(self) -> Response {
        let status = match &self {
            TemplateError::NameRequired(_)
            | TemplateError::DateRequired
            | TemplateError::RangeRequired => StatusCode::BAD_REQUEST,
            TemplateError::AlreadyExists(_) => StatusCode::CONFLICT,
            TemplateError::NotFound(_) | TemplateError::NoDataForDate => StatusCode::NOT_FOUND,
            TemplateError::SaveFailed(_)
            | TemplateError::RemoveFailed(_)
            | TemplateError::DailySaveFailed
            | TemplateError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[derive(Clone)]
struct ListScope {
    store: Arc<TemplateStore>,
    kind: TemplateKind,
}

/// Mounts every template list plus `/daily-data`. The returned router
/// carries its own state, so it merges into any parent router.
pub fn templates_router<S>(store: Arc<TemplateStore>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    let router = TemplateKind::ALL.into_iter().fold(Router::new(), |router, kind| {
        router.nest(kind.path(), list_router(Arc::clone(&store), kind))
    });

    router.nest("/daily-data", daily_router(store))
}

fn list_router<S>(store: Arc<TemplateStore>, kind: TemplateKind) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/", get(list_templates).post(add_template))
        .route("/{name}", delete(remove_template))
        .with_state(ListScope { store, kind })
}

fn daily_router<S>(store: Arc<TemplateStore>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/", get(all_daily).post(save_daily))
        .route("/range", get(daily_range))
        .route("/{date}", get(daily_for_date))
        .with_state(store)
}

async fn list_templates(State(scope): State<ListScope>) -> Json<Vec<String>> {
    Json(scope.store.list(scope.kind).await)
}

async fn add_template(
    State(scope): State<ListScope>,
    body: Option<Json<NewTemplate>>,
) -> Result<Json<Value>, TemplateError> {
    let body = body.map(|Json(b)| b).unwrap_or_default();
    let names = scope.store.add(scope.kind, &body).await?;
    Ok(Json(json!({
        "message": format!("{} added successfully", scope.kind.label()),
        scope.kind.key(): names,
    })))
}

async fn remove_template(
    State(scope): State<ListScope>,
    Path(name): Path<String>,
) -> Result<Json<Value>, TemplateError> {
    let names = scope.store.remove(scope.kind, &name).await?;
    Ok(Json(json!({
        "message": format!("{} removed successfully", scope.kind.label()),
        scope.kind.key(): names,
    })))
}

async fn save_daily(
    State(store): State<Arc<TemplateStore>>,
    body: Option<Json<Value>>,
) -> Result<Json<Value>, TemplateError> {
    let body = body.map(|Json(b)| b).unwrap_or(Value::Null);
    let data = store.add_daily(body).await?;
    Ok(Json(json!({
        "message": "Daily data saved successfully",
        "data": data,
    })))
}

async fn all_daily(State(store): State<Arc<TemplateStore>>) -> Json<Vec<DailyEntry>> {
    Json(store.daily_all().await)
}

async fn daily_range(
    State(store): State<Arc<TemplateStore>>,
    Query(range): Query<DateRange>,
) -> Result<Json<Vec<DailyEntry>>, TemplateError> {
    Ok(Json(store.daily_range(&range).await?))
}

async fn daily_for_date(
    State(store): State<Arc<TemplateStore>>,
    Path(date): Path<String>,
) -> Result<Json<Vec<DailyEntry>>, TemplateError> {
    Ok(Json(store.daily_for_date(&date).await?))
}
