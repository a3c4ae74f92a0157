//! `POST /api/analyze`: upload an inventory export, get the classified report.
//!
//! DESIGN
//! ======
//! The multipart body is read on the async side. Parsing, classification and
//! workbook generation are CPU-bound and run together in `spawn_blocking`
//! over a matrix snapshot loaded beforehand.

use std::path::Path;
use std::sync::Arc;

use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::response::{IntoResponse, Response};
use chrono::{Local, NaiveDate};
use tracing::{error, info};

use super::ANALYSIS_SUMMARY_HEADER;
use crate::error::{ApiError, ErrorCode};
use crate::services::classification::{self, TierSummary};
use crate::services::file_parser::{self, ParseError};
use crate::services::matrix::MatrixSnapshot;
use crate::services::os_normalizer::OsNormalizer;
use crate::services::report::{self, ReportError, ReportOptions};
use crate::state::AppState;

pub const XLSX_CONTENT_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
const DEFAULT_UPLOAD_NAME: &str = "upload.xlsx";

#[derive(Debug, thiserror::Error)]
enum AnalyzeError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Report(#[from] ReportError),
}

struct Upload {
    filename: String,
    bytes: Vec<u8>,
    customer_name: Option<String>,
}

struct Analysis {
    workbook: Vec<u8>,
    filename: String,
    summary: TierSummary,
}

/// Accept an RVTools or CloudPhysics `.xlsx` and return the branded report.
///
/// Multipart fields: `file` (required), `customer_name` (optional).
pub async fn analyze(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, ApiError> {
    let mut multipart =
        multipart.map_err(|e| ApiError::new(StatusCode::BAD_REQUEST, "INVALID_REQUEST", e.body_text()))?;

    let limit_mb = state.settings.max_upload_size_mb;
    let upload = read_upload(&mut multipart, limit_mb).await?;
    if upload.bytes.len() > state.settings.max_upload_bytes() {
        return Err(too_large(limit_mb));
    }
    info!(filename = %upload.filename, bytes = upload.bytes.len(), "file received");

    let snapshot = MatrixSnapshot::load(&state.pool).await.map_err(|e| {
        error!(error = %e, "failed to load compatibility matrix");
        processing_error(&e)
    })?;

    let normalizer = Arc::clone(&state.normalizer);
    let logo_path = state.settings.report_logo_path.clone();
    let max_bytes = state.settings.max_upload_bytes();
    let date = Local::now().date_naive();
    let filename = upload.filename.clone();

    let analysis = tokio::task::spawn_blocking(move || {
        run_pipeline(&upload, &normalizer, &snapshot, max_bytes, &logo_path, date)
    })
    .await
    .map_err(|e| {
        error!(error = %e, filename = %filename, "analysis task failed");
        processing_error(&e)
    })?
    .map_err(|e| analyze_error(e, limit_mb, &filename))?;

    let summary = serde_json::to_string(&analysis.summary).map_err(|e| processing_error(&e))?;
    info!(filename = %filename, summary = %summary, "analysis complete");

    Ok((
        StatusCode::OK,
        [
            (CONTENT_TYPE, XLSX_CONTENT_TYPE.to_owned()),
            (CONTENT_DISPOSITION, format!("attachment; filename=\"{}\"", analysis.filename)),
            (ANALYSIS_SUMMARY_HEADER, summary),
        ],
        analysis.workbook,
    )
        .into_response())
}

fn run_pipeline(
    upload: &Upload,
    normalizer: &OsNormalizer,
    snapshot: &MatrixSnapshot,
    max_bytes: usize,
    logo_path: &Path,
    date: NaiveDate,
) -> Result<Analysis, AnalyzeError> {
    let rows = file_parser::parse(&upload.bytes, &upload.filename, max_bytes)?;
    let classified = classification::classify_all(&rows, normalizer, snapshot);
    let customer_name = upload.customer_name.as_deref();
    let options = ReportOptions { customer_name, logo_path: Some(logo_path), analysis_date: date };
    let workbook = report::build(&classified, &options)?;

    Ok(Analysis {
        workbook,
        filename: report::build_filename(customer_name, date),
        summary: TierSummary::from_vms(&classified),
    })
}

async fn read_upload(multipart: &mut Multipart, limit_mb: u64) -> Result<Upload, ApiError> {
    let mut file: Option<(String, Vec<u8>)> = None;
    let mut customer_name = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| multipart_error(&e, limit_mb))? {
        let name = field.name().unwrap_or_default().to_owned();
        match name.as_str() {
            "file" => {
                let filename = field.file_name().unwrap_or(DEFAULT_UPLOAD_NAME).to_owned();
                let bytes = field.bytes().await.map_err(|e| multipart_error(&e, limit_mb))?;
                file = Some((filename, bytes.to_vec()));
            }
            "customer_name" => {
                let text = field.text().await.map_err(|e| multipart_error(&e, limit_mb))?;
                let trimmed = text.trim();
                customer_name = (!trimmed.is_empty()).then(|| trimmed.to_owned());
            }
            _ => {}
        }
    }

    let (filename, bytes) = file.ok_or_else(|| {
        ApiError::new(StatusCode::BAD_REQUEST, "INVALID_REQUEST", "Missing required multipart field 'file'.")
    })?;
    Ok(Upload { filename, bytes, customer_name })
}

fn multipart_error(err: &MultipartError, limit_mb: u64) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        too_large(limit_mb)
    } else {
        ApiError::new(StatusCode::BAD_REQUEST, "INVALID_REQUEST", err.body_text())
    }
}

fn too_large(limit_mb: u64) -> ApiError {
    ApiError::new(StatusCode::PAYLOAD_TOO_LARGE, "FILE_TOO_LARGE", format!("File exceeds the {limit_mb} MB limit."))
}

fn processing_error(err: &dyn std::fmt::Display) -> ApiError {
    ApiError::new(
        StatusCode::INTERNAL_SERVER_ERROR,
        "PROCESSING_ERROR",
        format!("An unexpected error occurred: {err}"),
    )
}

fn analyze_error(err: AnalyzeError, limit_mb: u64, filename: &str) -> ApiError {
    match err {
        AnalyzeError::Parse(ParseError::FileTooLarge(_)) => too_large(limit_mb),
        AnalyzeError::Parse(parse) => {
            let api = ApiError::from_error(StatusCode::BAD_REQUEST, &parse);
            match parse {
                ParseError::MissingColumns(missing) => api.with_missing(missing),
                _ => api,
            }
        }
        AnalyzeError::Report(err) => {
            error!(error = %err, filename, "report generation failed");
            ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                err.error_code(),
                format!("An unexpected error occurred: {err}"),
            )
        }
    }
}

#[cfg(test)]
#[path = "analyze_test.rs"]
mod tests;
