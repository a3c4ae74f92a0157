mod config;
mod db;
mod error;
mod routes;
mod services;
mod state;
mod tier;
mod ui;

use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = config::Settings::from_env();

    let pool = db::init_pool(&settings.database_url, settings.db_max_connections)
        .await
        .expect("database init failed");
    let seeded = db::seed::seed_database(&pool).await.expect("database seed failed");
    tracing::info!(matrix_rows = seeded.matrix_rows, migration_paths = seeded.migration_paths, "seed complete");

    let port = settings.port;
    let environment = settings.environment.clone();
    let state = state::AppState::new(pool, settings);

    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .expect("failed to bind");

    tracing::info!(%port, %environment, "vme-analyzer listening");
    axum::serve(listener, app).await.expect("server failed");
}
