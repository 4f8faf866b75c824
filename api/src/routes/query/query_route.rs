//! POST /api/v1/query — retrieval-augmented answer with the confidence gate.

use std::sync::Arc;

use axum::{Json, extract::State};
use qa_engine::QueryRequest;
use tracing::{debug, info};

use crate::{
    core::app_state::AppState,
    error_handler::AppResult,
    routes::query::query_request::{QueryApiRequest, QueryApiResponse},
};

/// Handler: POST /api/v1/query
///
/// # Example
/// ```bash
/// curl -X POST http://127.0.0.1:8080/api/v1/query \
///   -H 'content-type: application/json' \
///   -d '{"consulta":"¿Qué diferencia hay entre el Pack Completo y el Básico?"}'
/// ```
pub async fn query_route(
    State(state): State<Arc<AppState>>,
    Json(body): Json<QueryApiRequest>,
) -> AppResult<Json<QueryApiResponse>> {
    debug!(consulta = %body.consulta, "query_route: start");

    let outcome = state
        .engine
        .answer(QueryRequest {
            consulta: body.consulta,
            contexto_previo: body.contexto_previo,
            contexto_actual: body.contexto_actual,
        })
        .await?;

    info!(
        hits = outcome.matches.len(),
        puede_responder = outcome.generated.puede_responder,
        latency_ms = outcome.elapsed_ms,
        "query_route: done"
    );

    Ok(Json(QueryApiResponse {
        puede_responder: outcome.generated.puede_responder,
        respuesta_generada: outcome.generated.respuesta,
        resultados: outcome.matches,
        tiempo_respuesta: outcome.elapsed_ms,
    }))
}
