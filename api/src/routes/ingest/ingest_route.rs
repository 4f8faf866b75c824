//! POST /api/v1/ingest — batch-ingest Q&A records.

use std::sync::Arc;

use axum::{Json, extract::State};
use tracing::info;

use crate::{
    core::app_state::AppState,
    error_handler::{AppError, AppResult},
    routes::ingest::ingest_request::{IngestApiRequest, IngestApiResponse},
};

/// Handler: POST /api/v1/ingest
///
/// Accepts inline `items` or a server-side `dataset_path`. Per-record
/// problems land in the report; only infrastructure failures are errors.
pub async fn ingest_route(
    State(state): State<Arc<AppState>>,
    Json(body): Json<IngestApiRequest>,
) -> AppResult<Json<IngestApiResponse>> {
    let report = if !body.items.is_empty() {
        state.engine.ingest(body.items).await?
    } else if let Some(path) = body.dataset_path {
        state.engine.ingest_file(&path).await?
    } else {
        return Err(AppError::BadRequest(
            "either items or dataset_path must be provided".into(),
        ));
    };

    info!(
        total = report.total,
        inserted = report.inserted,
        updated = report.updated,
        skipped = report.skipped,
        failed = report.failed,
        "ingest_route: done"
    );
    Ok(Json(report))
}
