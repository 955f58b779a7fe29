use crate::handlers::{health, not_found};
use axum::{
    handler::HandlerWithoutStateExt,
    http::{Method, header},
    routing::get,
    Router,
};
use categories::handler::categories_router;
use common::AppState;
use dashboard::{DashboardController, DashboardState, dashboard_router};
use records::handler::records_router;
use std::sync::Arc;
use templates::{TemplateStore, templates_router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub fn build_router(
    state: Arc<AppState>,
    store: Arc<TemplateStore>,
    controller: Arc<DashboardController>,
) -> Router {
    let dashboard = DashboardState {
        db: state.db.clone(),
        controller,
    };

    let api = Router::<Arc<AppState>>::new()
        .route("/health", get(health))
        .nest("/records", records_router(state.clone()))
        .nest("/categories", categories_router(state.clone()))
        .nest("/dashboard", dashboard_router(dashboard))
        .merge(templates_router(store));

    let static_files = ServeDir::new(&state.config.static_dir)
        .call_fallback_on_method_not_allowed(true)
        .fallback(not_found.into_service());

    Router::<Arc<AppState>>::new()
        .nest("/api", api)
        .fallback_service(static_files)
        .with_state(state)
        .layer(cors())
        .layer(TraceLayer::new_for_http())
}

fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use axum::response::Response;
    use common::Config;
    use database::get_test_db;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    struct TestApp {
        router: Router,
        controller: Arc<DashboardController>,
        _data: tempfile::TempDir,
        _public: tempfile::TempDir,
    }

    async fn test_app() -> TestApp {
        let data = tempfile::tempdir().unwrap();
        let public = tempfile::tempdir().unwrap();
        tokio::fs::write(public.path().join("index.html"), "<h1>tracker</h1>")
            .await
            .unwrap();

        let config = Config {
            data_dir: data.path().to_path_buf(),
            static_dir: public.path().to_path_buf(),
            ..Config::for_tests()
        };
        let state = Arc::new(AppState::new(get_test_db().await, config));
        let store = Arc::new(TemplateStore::open(data.path()).await.unwrap());
        let controller = DashboardController::attach(
            state.db.clone(),
            &state.feed,
            "2024-02".parse().unwrap(),
        )
        .await
        .unwrap();

        TestApp {
            router: build_router(state, store, Arc::clone(&controller)),
            controller,
            _data: data,
            _public: public,
        }
    }

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let app = test_app().await;

        let response = app
            .router
            .oneshot(Request::builder().uri("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "OK");
        assert!(body["uptime"].as_f64().unwrap() >= 0.0);
        assert!(body["timestamp"].as_str().unwrap().ends_with('Z'));

        app.controller.teardown().await;
    }

    #[tokio::test]
    async fn test_unknown_route_is_json_404() {
        let app = test_app().await;

        for (method, uri) in [("GET", "/api/nowhere"), ("POST", "/missing.txt")] {
            let response = app
                .router
                .clone()
                .oneshot(Request::builder().method(method).uri(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::NOT_FOUND);
            assert_eq!(body_json(response).await, json!({ "error": "Route not found" }));
        }

        app.controller.teardown().await;
    }

    #[tokio::test]
    async fn test_static_files_served() {
        let app = test_app().await;

        let response = app
            .router
            .oneshot(Request::builder().uri("/index.html").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"<h1>tracker</h1>");

        app.controller.teardown().await;
    }

    #[tokio::test]
    async fn test_cors_allows_any_origin() {
        let app = test_app().await;

        let response = app
            .router
            .oneshot(
                Request::builder()
                    .uri("/api/expenses")
                    .header(header::ORIGIN, "http://example.com")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");

        app.controller.teardown().await;
    }

    #[tokio::test]
    async fn test_api_mounts() {
        let app = test_app().await;

        let response = app
            .router
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/categories/options?kind=Expense")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["names"][0], "Food");

        let response = app
            .router
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/records")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(
                        json!({
                            "kind": "Sale",
                            "date": "2024-02-10",
                            "items": [{ "category": "Retail", "amount": 80 }]
                        })
                        .to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = app
            .router
            .oneshot(Request::builder().uri("/api/dashboard/sales/2024-02").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(body_json(response).await["summary"]["total"], 80.0);

        app.controller.teardown().await;
    }
}
