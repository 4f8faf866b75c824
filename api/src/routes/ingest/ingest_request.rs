use qa_store::{IngestionReport, QaRecord};
use serde::Deserialize;

/// Request payload for /api/v1/ingest: either inline records or a dataset
/// file path on the server.
#[derive(Debug, Deserialize)]
pub struct IngestApiRequest {
    /// Inline records to ingest.
    #[serde(default)]
    pub items: Vec<QaRecord>,
    /// Path to a JSON array dataset file; used when `items` is empty.
    #[serde(default)]
    pub dataset_path: Option<String>,
}

/// The ingestion report serializes as-is.
pub type IngestApiResponse = IngestionReport;
