use std::io::Cursor;

use axum::body::{Body, to_bytes};
use axum::http::Request;
use calamine::{Reader, Xlsx};
use serde_json::Value;
use tower::ServiceExt;

use super::*;
use crate::config::Settings;
use crate::routes::app;
use crate::state::test_helpers::{cloudphysics_fixture, rvtools_fixture, test_app_state, test_app_state_with, workbook};

const BOUNDARY: &str = "vme-test-boundary";

enum Part<'a> {
    File { filename: &'a str, bytes: &'a [u8] },
    Text { name: &'a str, value: &'a str },
}

fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::File { filename, bytes } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n\
                         Content-Type: {XLSX_CONTENT_TYPE}\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(bytes);
            }
            Part::Text { name, value } => {
                body.extend_from_slice(format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes());
                body.extend_from_slice(value.as_bytes());
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn upload_request(parts: &[Part<'_>]) -> Request<Body> {
    Request::post("/api/analyze")
        .header(CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"))
        .body(Body::from(multipart_body(parts)))
        .unwrap()
}

async fn send(state: AppState, request: Request<Body>) -> Response {
    app(state).oneshot(request).await.unwrap()
}

async fn error_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn summary_header(response: &Response) -> Value {
    let raw = response.headers().get(&ANALYSIS_SUMMARY_HEADER).expect("summary header present");
    serde_json::from_str(raw.to_str().unwrap()).unwrap()
}

// =============================================================================
// successful analysis
// =============================================================================

#[tokio::test]
async fn rvtools_upload_returns_branded_report() {
    let fixture = rvtools_fixture();
    let request = upload_request(&[
        Part::File { filename: "rvtools.xlsx", bytes: &fixture },
        Part::Text { name: "customer_name", value: "Acme Corp" },
    ]);
    let response = send(test_app_state().await, request).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[CONTENT_TYPE], XLSX_CONTENT_TYPE);
    let disposition = response.headers()[CONTENT_DISPOSITION].to_str().unwrap().to_owned();
    assert!(disposition.starts_with("attachment; filename=\"VME-Analysis-Acme-Corp-"), "{disposition}");
    assert!(disposition.ends_with(".xlsx\""));

    let summary = summary_header(&response);
    assert_eq!(summary["total"], 6);
    assert_eq!(summary["officially_supported"], 3);
    assert_eq!(summary["not_supported"], 1);
    assert_eq!(summary["needs_info"], 1);
    assert_eq!(summary["supported_vdi"], 1);

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let report = Xlsx::new(Cursor::new(bytes.to_vec())).unwrap();
    assert_eq!(report.sheet_names(), vec!["VM Detail", "Summary", "Executive Summary"]);
}

#[tokio::test]
async fn cloudphysics_upload_without_customer() {
    let fixture = cloudphysics_fixture();
    let request = upload_request(&[Part::File { filename: "cloudphysics.xlsx", bytes: &fixture }]);
    let response = send(test_app_state().await, request).await;

    assert_eq!(response.status(), StatusCode::OK);
    let disposition = response.headers()[CONTENT_DISPOSITION].to_str().unwrap();
    assert!(disposition.starts_with("attachment; filename=\"VME-Analysis-20"), "{disposition}");
    assert_eq!(summary_header(&response)["total"], 4);
}

#[tokio::test]
async fn blank_customer_name_is_ignored() {
    let fixture = cloudphysics_fixture();
    let request = upload_request(&[
        Part::Text { name: "customer_name", value: "   " },
        Part::File { filename: "cp.xlsx", bytes: &fixture },
    ]);
    let response = send(test_app_state().await, request).await;

    assert_eq!(response.status(), StatusCode::OK);
    let disposition = response.headers()[CONTENT_DISPOSITION].to_str().unwrap();
    assert!(!disposition.contains("VME-Analysis--"));
}

// =============================================================================
// rejected uploads
// =============================================================================

#[tokio::test]
async fn csv_upload_is_unrecognized() {
    let request = upload_request(&[Part::File { filename: "inventory.csv", bytes: b"VM,OS\nvm1,Linux\n" }]);
    let response = send(test_app_state().await, request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = error_body(response).await;
    assert_eq!(body["error"], true);
    assert_eq!(body["code"], "UNRECOGNIZED_FORMAT");
    assert!(body.get("missing").is_none());
}

#[tokio::test]
async fn missing_columns_are_listed() {
    let partial = workbook(&[(
        "vInfo",
        &[&["VM", "Powerstate", "OS according to VMware Tools"], &["my-vm", "poweredOn", "Windows Server 2022"]],
    )]);
    let request = upload_request(&[Part::File { filename: "partial.xlsx", bytes: &partial }]);
    let response = send(test_app_state().await, request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = error_body(response).await;
    assert_eq!(body["code"], "MISSING_COLUMNS");
    assert_eq!(body["missing"], serde_json::json!(["OS according to configuration file"]));
    assert_eq!(body["message"], "Missing required columns: OS according to configuration file");
}

#[tokio::test]
async fn file_over_limit_is_rejected() {
    let settings = Settings { max_upload_size_mb: 1, ..Settings::default() };
    let oversized = vec![b'x'; 1024 * 1024 + 512 * 1024];
    let request = upload_request(&[Part::File { filename: "big.xlsx", bytes: &oversized }]);
    let response = send(test_app_state_with(settings).await, request).await;

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    let body = error_body(response).await;
    assert_eq!(body["code"], "FILE_TOO_LARGE");
    assert_eq!(body["message"], "File exceeds the 1 MB limit.");
}

#[tokio::test]
async fn body_over_transport_limit_is_rejected() {
    let settings = Settings { max_upload_size_mb: 1, ..Settings::default() };
    let oversized = vec![b'x'; 3 * 1024 * 1024];
    let request = upload_request(&[Part::File { filename: "huge.xlsx", bytes: &oversized }]);
    let response = send(test_app_state_with(settings).await, request).await;

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(error_body(response).await["code"], "FILE_TOO_LARGE");
}

#[tokio::test]
async fn missing_file_field_is_invalid() {
    let request = upload_request(&[Part::Text { name: "customer_name", value: "Acme" }]);
    let response = send(test_app_state().await, request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = error_body(response).await;
    assert_eq!(body["code"], "INVALID_REQUEST");
    assert_eq!(body["message"], "Missing required multipart field 'file'.");
}

#[tokio::test]
async fn non_multipart_request_is_invalid() {
    let request = Request::post("/api/analyze")
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from("{}"))
        .unwrap();
    let response = send(test_app_state().await, request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_body(response).await["code"], "INVALID_REQUEST");
}

// =============================================================================
// error mapping
// =============================================================================

#[test]
fn parse_too_large_uses_configured_limit_message() {
    let err = AnalyzeError::Parse(ParseError::FileTooLarge("File 'x' exceeds the 25MB size limit.".into()));
    let api = analyze_error(err, 25, "x.xlsx");
    assert_eq!(api.status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(api.code, "FILE_TOO_LARGE");
    assert_eq!(api.message, "File exceeds the 25 MB limit.");
}

#[test]
fn report_failure_is_processing_error() {
    let err = AnalyzeError::Report(ReportError::Xlsx(rust_xlsxwriter::XlsxError::ParameterError("bad".into())));
    let api = analyze_error(err, 25, "x.xlsx");
    assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(api.code, "PROCESSING_ERROR");
    assert!(api.message.starts_with("An unexpected error occurred: "));
}
