//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! One Axum router serves the page shell, static assets, the analysis upload
//! endpoint and the admin matrix API. Uploads are capped by
//! `DefaultBodyLimit` at the configured size plus multipart framing headroom;
//! the handler enforces the exact limit on the file itself.

pub mod admin;
pub mod analyze;
pub mod pages;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::HeaderName;
use axum::http::header::CONTENT_DISPOSITION;
use axum::response::Json;
use axum::routing::{get, post, put};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub use crate::error::ApiError;

/// Room for multipart boundaries and the small text fields.
const MULTIPART_HEADROOM: usize = 1024 * 1024;

pub const ANALYSIS_SUMMARY_HEADER: HeaderName = HeaderName::from_static("x-analysis-summary");

/// Build the application router.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .expose_headers([ANALYSIS_SUMMARY_HEADER, CONTENT_DISPOSITION]);

    let body_limit = state.settings.max_upload_bytes().saturating_add(MULTIPART_HEADROOM);
    let assets = ServeDir::new(&state.settings.assets_dir);

    Router::new()
        .route("/", get(pages::shell))
        .route("/admin", get(pages::shell))
        .route("/health", get(health))
        .route("/api/analyze", post(analyze::analyze))
        .route("/api/admin/matrix", get(admin::list_matrix).post(admin::create_matrix_entry))
        .route(
            "/api/admin/matrix/{id}",
            put(admin::update_matrix_entry).delete(admin::delete_matrix_entry),
        )
        .route("/api/admin/migration-paths", get(admin::list_migration_paths))
        .route("/api/admin/migration-paths/{id}", put(admin::update_migration_path))
        .nest_service("/assets", assets)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
