//! Admin routes for the compatibility matrix and migration guidance.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::Deserialize;
use tracing::error;

use crate::error::ApiError;
use crate::services::matrix::{self, MatrixEntry, MatrixEntryPatch, MatrixError, MigrationPath, NewMatrixEntry};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct UpdateMigrationPathBody {
    pub guidance_text: String,
}

/// `GET /api/admin/matrix`: every entry, ordered by id.
pub async fn list_matrix(State(state): State<AppState>) -> Result<Json<Vec<MatrixEntry>>, ApiError> {
    let entries = matrix::list_entries(&state.pool).await.map_err(matrix_error_to_api)?;
    Ok(Json(entries))
}

/// `POST /api/admin/matrix`: create an entry.
pub async fn create_matrix_entry(
    State(state): State<AppState>,
    body: Result<Json<NewMatrixEntry>, JsonRejection>,
) -> Result<(StatusCode, Json<MatrixEntry>), ApiError> {
    let Json(body) = body.map_err(json_rejection)?;
    let entry = matrix::create_entry(&state.pool, &body).await.map_err(matrix_error_to_api)?;
    Ok((StatusCode::CREATED, Json(entry)))
}

/// `PUT /api/admin/matrix/{id}`: update only the provided fields.
pub async fn update_matrix_entry(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    body: Result<Json<MatrixEntryPatch>, JsonRejection>,
) -> Result<Json<MatrixEntry>, ApiError> {
    let Json(patch) = body.map_err(json_rejection)?;
    let entry = matrix::update_entry(&state.pool, id, patch).await.map_err(matrix_error_to_api)?;
    Ok(Json(entry))
}

/// `DELETE /api/admin/matrix/{id}`
pub async fn delete_matrix_entry(State(state): State<AppState>, Path(id): Path<i64>) -> Result<StatusCode, ApiError> {
    matrix::delete_entry(&state.pool, id).await.map_err(matrix_error_to_api)?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /api/admin/migration-paths`: every path, ordered by id.
pub async fn list_migration_paths(State(state): State<AppState>) -> Result<Json<Vec<MigrationPath>>, ApiError> {
    let paths = matrix::list_migration_paths(&state.pool).await.map_err(matrix_error_to_api)?;
    Ok(Json(paths))
}

/// `PUT /api/admin/migration-paths/{id}`: replace the guidance text.
pub async fn update_migration_path(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    body: Result<Json<UpdateMigrationPathBody>, JsonRejection>,
) -> Result<Json<MigrationPath>, ApiError> {
    let Json(body) = body.map_err(json_rejection)?;
    let path = matrix::update_migration_path(&state.pool, id, &body.guidance_text)
        .await
        .map_err(matrix_error_to_api)?;
    Ok(Json(path))
}

pub(crate) fn matrix_error_to_api(err: MatrixError) -> ApiError {
    let status = match &err {
        MatrixError::NotFound(..) => StatusCode::NOT_FOUND,
        MatrixError::Validation(_) => StatusCode::BAD_REQUEST,
        MatrixError::Database(e) => {
            error!(error = %e, "admin query failed");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    ApiError::from_error(status, &err)
}

fn json_rejection(rejection: JsonRejection) -> ApiError {
    ApiError::new(StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR", rejection.body_text())
}

#[cfg(test)]
#[path = "admin_test.rs"]
mod tests;
