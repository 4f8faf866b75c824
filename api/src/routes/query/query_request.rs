use qa_store::SearchResult;
use serde::{Deserialize, Serialize};

/// Request payload for /api/v1/query.
#[derive(Debug, Deserialize)]
pub struct QueryApiRequest {
    /// The user's question.
    pub consulta: String,
    /// Optional summary of previous conversations.
    #[serde(default)]
    pub contexto_previo: Option<String>,
    /// Optional running context of the current conversation.
    #[serde(default)]
    pub contexto_actual: Option<String>,
}

/// Response payload for /api/v1/query.
#[derive(Debug, Serialize)]
pub struct QueryApiResponse {
    /// Whether the corpus contained enough evidence to answer.
    pub puede_responder: bool,
    /// The generated answer, or a polite refusal.
    pub respuesta_generada: String,
    /// The retrieved evidence, ranked by similarity.
    pub resultados: Vec<SearchResult>,
    /// End-to-end latency in milliseconds.
    pub tiempo_respuesta: u128,
}
