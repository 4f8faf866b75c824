//! GET /health — reachability of Qdrant and the completion provider.

use std::sync::Arc;

use axum::{Json, extract::State};
use qa_engine::{HealthReport, engine::health};

use crate::core::app_state::AppState;

/// Handler: GET /health. Never fails; degraded collaborators show up as
/// `false` in the report.
pub async fn health_route(State(state): State<Arc<AppState>>) -> Json<HealthReport> {
    let report = health(&state.facade, &state.health, &state.completion_cfg).await;
    Json(report)
}
