//! `/report`, `/health` and docs integration tests.
//!
//! Run with: `cargo test -p malscan-api --test report_test`

mod helpers;

use helpers::fixtures::{self, HELLO_BYTES};
use helpers::{setup_test_app, RecordingProvider};
use serde_json::{json, Value};
use std::io::Write;
use std::sync::{Arc, Mutex};
use tracing_subscriber::EnvFilter;

fn app() -> helpers::TestApp {
    setup_test_app(Arc::new(RecordingProvider::known(fixtures::verdicts(0))))
}

#[tokio::test]
async fn test_report_download_after_scan() {
    let app = app();

    let body: Value = app
        .client()
        .post("/scan")
        .multipart(fixtures::file_form("hello.txt", HELLO_BYTES))
        .await
        .json();
    let report_url = body["report_url"].as_str().unwrap().to_string();

    let response = app.client().get(&report_url).await;
    assert_eq!(response.status_code(), 200);
    assert_eq!(response.header("content-type"), "application/pdf");
    let disposition = response.header("content-disposition");
    assert!(disposition.to_str().unwrap().starts_with("attachment"));
    assert!(response.as_bytes().starts_with(b"%PDF-"));
}

#[tokio::test]
async fn test_missing_report_is_404() {
    let app = app();

    let response = app.client().get("/report/report-doesnotexist.pdf").await;
    assert_eq!(response.status_code(), 404);
    assert_eq!(response.json::<Value>(), json!({ "error": "Report not found" }));
}

#[tokio::test]
async fn test_traversal_stays_inside_reports_dir() {
    let app = app();

    // A file one level above the reports directory must not be reachable.
    let outside = app.reports_dir().parent().unwrap().join("secret.pdf");
    std::fs::write(&outside, b"%PDF-secret").unwrap();

    let response = app.client().get("/report/../secret.pdf").await;
    assert_eq!(response.status_code(), 404);

    let response = app.client().get("/report/..%2Fsecret.pdf").await;
    assert_eq!(response.status_code(), 404);
}

#[tokio::test]
async fn test_sanitised_name_is_served() {
    let app = app();
    std::fs::write(app.reports_dir().join("etc_passwd"), b"not really").unwrap();

    // "../../etc/passwd" flattens to "etc_passwd" inside the reports directory.
    let response = app.client().get("/report/..%2F..%2Fetc%2Fpasswd").await;
    assert_eq!(response.status_code(), 200);
    assert_eq!(response.header("content-type"), "application/octet-stream");
    assert_eq!(response.as_bytes().as_ref(), b"not really");
}

#[tokio::test]
async fn test_health() {
    let app = app();
    let response = app.client().get("/health").await;
    assert_eq!(response.status_code(), 200);
    assert_eq!(response.json::<Value>(), json!({ "status": "alive" }));
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let app = app();
    let response = app.client().get("/api/openapi.json").await;
    assert_eq!(response.status_code(), 200);
    let spec: Value = response.json();
    assert!(spec["paths"]["/scan"].is_object());
}

#[derive(Clone, Default)]
struct CapturedLog(Arc<Mutex<Vec<u8>>>);

impl Write for CapturedLog {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[tokio::test]
async fn test_requests_are_logged_under_default_filter() {
    let captured = CapturedLog::default();
    let writer = captured.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(malscan_infra::DEFAULT_FILTER))
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let app = app();
    app.client().get("/health").await.assert_status_ok();

    let output = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
    assert!(output.contains("finished processing request"), "{output}");
    assert!(output.contains("/health"), "{output}");
}
