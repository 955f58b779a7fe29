use crate::models::{Category, CategoryOptions, RawCreateCategoryRequest};
use crate::service::{CategoryError, CategoryService, DUPLICATE_CATEGORY};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get},
    Json, Router,
};
use common::AppState;
use rollup::RecordKind;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

impl IntoResponse for CategoryError {
    fn into_response(self) -> Response {
        let (status, msg) = match self {
            CategoryError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            CategoryError::Conflict => (StatusCode::CONFLICT, DUPLICATE_CATEGORY.to_string()),
            CategoryError::NotFound => (StatusCode::NOT_FOUND, "Category not found".to_string()),
            CategoryError::Infrastructure(e) => {
                tracing::error!("category storage failure: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(json!({ "error": msg }))).into_response()
    }
}

pub fn categories_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_categories).post(create_category))
        .route("/options", get(category_options))
        .route("/{id}", delete(delete_category))
        .with_state(state)
}

#[derive(Deserialize)]
struct OptionsQuery {
    kind: String,
}

async fn list_categories(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Category>>, CategoryError> {
    let categories = CategoryService::list_categories(&state.db).await?;
    Ok(Json(categories))
}

async fn create_category(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RawCreateCategoryRequest>,
) -> Result<impl IntoResponse, CategoryError> {
    let category = CategoryService::create_category(&state.db, payload).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

async fn category_options(
    State(state): State<Arc<AppState>>,
    Query(query): Query<OptionsQuery>,
) -> Result<Json<CategoryOptions>, CategoryError> {
    let kind: RecordKind = query.kind.parse().map_err(CategoryError::InvalidInput)?;
    let options = CategoryService::options_for_kind(&state.db, kind).await?;
    Ok(Json(options))
}

async fn delete_category(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, CategoryError> {
    CategoryService::delete_category(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
