//! Capability trait for the vector store.
//!
//! Retrieval and ingestion depend on this trait rather than on the Qdrant
//! client directly, so an in-memory double can stand in during tests and
//! simulate outcomes (including failures) deterministically.
//! [`crate::qdrant_facade::QdrantFacade`] is the production implementation.

use std::collections::HashSet;
use std::{future::Future, pin::Pin};

use uuid::Uuid;

use crate::errors::StoreError;
use crate::record::QaRecord;

/// Raw similarity hit as reported by the store: point id, score, payload.
pub type RawHit = (String, f32, serde_json::Value);

/// Store interface used by retrieval and ingestion.
pub trait VectorStore: Send + Sync {
    /// k-NN search; the optional threshold is applied store-side.
    fn search<'a>(
        &'a self,
        vector: Vec<f32>,
        limit: usize,
        score_threshold: Option<f32>,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<RawHit>, StoreError>> + Send + 'a>>;

    /// Upserts `(id, vector, record)` points; returns the number sent.
    fn upsert_points<'a>(
        &'a self,
        batch: Vec<(Uuid, Vec<f32>, QaRecord)>,
    ) -> Pin<Box<dyn Future<Output = Result<usize, StoreError>> + Send + 'a>>;

    /// Which of the given ids already exist in the collection.
    fn existing_ids<'a>(
        &'a self,
        ids: &'a [Uuid],
    ) -> Pin<Box<dyn Future<Output = Result<HashSet<String>, StoreError>> + Send + 'a>>;
}
