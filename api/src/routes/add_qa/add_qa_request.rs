use qa_store::ItemStatus;
use serde::{Deserialize, Serialize};

/// Request payload for /api/v1/add: one Q&A item.
#[derive(Debug, Deserialize)]
pub struct AddQaApiRequest {
    /// Category keyword for the item.
    pub keyword: String,
    /// The canonical question.
    pub pregunta: String,
    /// The canonical answer.
    pub respuesta: String,
}

/// Response payload for /api/v1/add.
#[derive(Debug, Serialize)]
pub struct AddQaApiResponse {
    /// Deterministic id assigned to the item.
    pub id: String,
    /// `inserted` or `updated`.
    pub status: ItemStatus,
    pub mensaje: String,
    /// The stored item, echoed back with its id.
    pub item: StoredItem,
}

#[derive(Debug, Serialize)]
pub struct StoredItem {
    pub id: String,
    pub keyword: String,
    pub pregunta: String,
    pub respuesta: String,
}
