use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use crate::utils::upload::secure_filename;
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use malscan_core::AppError;
use std::sync::Arc;

fn content_type_for(file_name: &str) -> &'static str {
    if file_name.to_ascii_lowercase().ends_with(".pdf") {
        "application/pdf"
    } else {
        "application/octet-stream"
    }
}

#[utoipa::path(
    get,
    path = "/report/{filename}",
    tag = "reports",
    params(
        ("filename" = String, Path, description = "Report file name, e.g. report-<sha256>.pdf")
    ),
    responses(
        (status = 200, description = "Report file", content_type = "application/pdf"),
        (status = 404, description = "Report not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "download_report"))]
pub async fn download_report(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> Result<Response, HttpAppError> {
    let not_found = || AppError::NotFound("Report not found".to_string());

    let safe_name = secure_filename(&filename);
    if safe_name.is_empty() {
        return Err(not_found().into());
    }

    let path = state.reports.reports_dir().join(&safe_name);
    match tokio::fs::metadata(&path).await {
        Ok(meta) if meta.is_file() => {}
        _ => return Err(not_found().into()),
    }
    let data = tokio::fs::read(&path).await.map_err(AppError::from)?;

    tracing::debug!(report = %safe_name, bytes = data.len(), "Serving report");

    let content_disposition = format!("attachment; filename=\"{}\"", safe_name);
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type_for(&safe_name).to_string()),
            (header::CONTENT_DISPOSITION, content_disposition),
        ],
        data,
    )
        .into_response())
}
