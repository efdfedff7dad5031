use crate::error::{ErrorResponse, HttpAppError};
use crate::services::scan_workflow;
use crate::state::AppState;
use crate::utils::upload::extract_scan_form;
use axum::{
    extract::{Multipart, State},
    Json,
};
use malscan_core::ScanResponse;
use std::sync::Arc;
use tracing::Instrument;
use uuid::Uuid;

#[utoipa::path(
    post,
    path = "/scan",
    tag = "scan",
    request_body(content = inline(Object), content_type = "multipart/form-data",
        description = "`file` (required) and `email` (optional report recipient)"),
    responses(
        (status = 200, description = "Scan completed", body = ScanResponse),
        (status = 400, description = "No file part or no file selected", body = ErrorResponse),
        (status = 413, description = "Upload too large", body = ErrorResponse),
        (status = 500, description = "Hashing or scan service failure", body = ErrorResponse)
    )
)]
pub async fn scan_file(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<ScanResponse>, HttpAppError> {
    let scan_id = Uuid::new_v4();
    let span = tracing::info_span!("scan", scan_id = %scan_id);

    async move {
        let upload = extract_scan_form(multipart).await?;

        // Cancels the poll if the client goes away and this future is dropped.
        let cancel = state.shutdown.child_token();
        let _guard = cancel.clone().drop_guard();

        let response = scan_workflow::run_scan(&state, upload, &cancel).await?;
        Ok(Json(response))
    }
    .instrument(span)
    .await
}
