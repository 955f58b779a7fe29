mod handlers;
mod router;

use clap::Parser;
use common::{AppState, Config};
use dashboard::DashboardController;
use database::Database;
use rollup::MonthKey;
use std::sync::Arc;
use templates::TemplateStore;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Environment and logging
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 2. Load Config from CLI args and env
    let config = Config::parse();

    // 3. Storage
    let db = Database::new(&config.database_url).await?;
    db.run_migrations().await?;

    let store = Arc::new(TemplateStore::open(&config.data_dir).await?);
    let state = Arc::new(AppState::new(db, config.clone()));

    // 4. Live dashboard for the current month
    let month = MonthKey::from_date(chrono::Local::now().date_naive());
    let controller = DashboardController::attach(state.db.clone(), &state.feed, month).await?;

    // 5. Routing
    let app = router::build_router(state, store, Arc::clone(&controller));

    // 6. Start Server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on {}", addr);
    tracing::info!("API available at http://localhost:{}/api/", config.port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    controller.teardown().await;
    tracing::info!("Shut down cleanly");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for ctrl-c: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
