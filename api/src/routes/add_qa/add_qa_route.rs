//! POST /api/v1/add — store a single Q&A item.

use std::sync::Arc;

use axum::{Json, extract::State};
use qa_store::QaRecord;
use tracing::info;

use crate::{
    core::app_state::AppState,
    error_handler::AppResult,
    routes::add_qa::add_qa_request::{AddQaApiRequest, AddQaApiResponse, StoredItem},
};

/// Handler: POST /api/v1/add
///
/// Validation failures return 422 and store nothing.
pub async fn add_qa_route(
    State(state): State<Arc<AppState>>,
    Json(body): Json<AddQaApiRequest>,
) -> AppResult<Json<AddQaApiResponse>> {
    let record = QaRecord {
        keyword: body.keyword,
        pregunta: body.pregunta,
        respuesta: body.respuesta,
    };
    let echoed = record.clone();

    let (id, status) = state.engine.add_item(record).await?;
    let id = id.to_string();

    info!(id = %id, keyword = %echoed.keyword, ?status, "add_qa_route: stored");

    Ok(Json(AddQaApiResponse {
        id: id.clone(),
        status,
        mensaje: "Q&A añadido correctamente".into(),
        item: StoredItem {
            id,
            keyword: echoed.keyword,
            pregunta: echoed.pregunta,
            respuesta: echoed.respuesta,
        },
    }))
}
