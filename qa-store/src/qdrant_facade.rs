//! Thin adapter around `qdrant-client` to isolate API usage.
//!
//! This facade concentrates all Qdrant interactions behind a minimal API,
//! hiding the verbose builder pattern and keeping the rest of the
//! application decoupled from `qdrant-client`:
//! - Connect over gRPC (`qdrant_client::Qdrant`), optional API key.
//! - Ensure the collection exists with the right dim/metric (no-op if present).
//! - Upsert points (UUID ids + dense vector + Q&A payload).
//! - k-NN search with an optional `score_threshold`.
//! - Liveness ping and existing-id lookups for ingestion reports.

use std::collections::HashSet;
use std::{future::Future, pin::Pin};

use qdrant_client::Qdrant;
use qdrant_client::qdrant::{
    CreateCollectionBuilder, Distance, GetPointsBuilder, PointId, PointStruct,
    SearchPointsBuilder, UpsertPointsBuilder, Value as QValue, VectorParamsBuilder,
};
use qdrant_client::Payload;
use serde_json::json;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::{DistanceKind, StoreConfig};
use crate::errors::StoreError;
use crate::record::QaRecord;
use crate::store::{RawHit, VectorStore};

/// A facade over the Qdrant client to keep the rest of the code clean and stable.
///
/// Encapsulates the underlying client, the target collection name, and the
/// vector-space parameters.
pub struct QdrantFacade {
    client: Qdrant,
    collection: String,
    distance: DistanceKind,
    vector_dim: usize,
}

impl QdrantFacade {
    /// Creates a new facade from the given configuration.
    ///
    /// Uses the builder-based API of `qdrant-client` and supports optional
    /// API key authentication.
    pub fn new(cfg: &StoreConfig) -> Result<Self, StoreError> {
        cfg.validate()?; // Early validation of config.

        let mut builder = Qdrant::from_url(&cfg.qdrant_url);
        if let Some(key) = &cfg.qdrant_api_key {
            builder = builder.api_key(key.clone());
        }
        let client = builder
            .build()
            .map_err(|e| StoreError::Qdrant(format!("client build: {e}")))?;

        Ok(Self {
            client,
            collection: cfg.collection.clone(),
            distance: cfg.distance,
            vector_dim: cfg.vector_dim,
        })
    }

    /// Ensures that the collection exists in Qdrant.
    ///
    /// - If the collection already exists → no-op.
    /// - If missing → creates it with the configured dimensionality and metric.
    pub async fn ensure_collection(&self) -> Result<(), StoreError> {
        info!(
            "Ensuring collection '{}' with size={} distance={:?}",
            self.collection, self.vector_dim, self.distance
        );

        match self.client.collection_info(&self.collection).await {
            Ok(_) => {
                debug!("Collection '{}' already exists", self.collection);
                return Ok(());
            }
            Err(err) => {
                warn!(
                    "Collection '{}' not found, will be created (error={})",
                    self.collection, err
                );
            }
        }

        let distance = match self.distance {
            DistanceKind::Cosine => Distance::Cosine,
            DistanceKind::Dot => Distance::Dot,
            DistanceKind::Euclid => Distance::Euclid,
        };

        self.client
            .create_collection(
                CreateCollectionBuilder::new(&self.collection)
                    .vectors_config(VectorParamsBuilder::new(self.vector_dim as u64, distance)),
            )
            .await
            .map_err(|e| StoreError::Qdrant(format!("create_collection: {e}")))?;

        info!("Collection '{}' created successfully", self.collection);
        Ok(())
    }

    /// Liveness probe against the Qdrant instance.
    pub async fn ping(&self) -> bool {
        self.client.health_check().await.is_ok()
    }

    /// Returns which of the given point ids already exist in the collection.
    ///
    /// Used by ingestion to distinguish inserts from updates; payloads and
    /// vectors are not fetched.
    pub async fn existing_ids(&self, ids: &[Uuid]) -> Result<HashSet<String>, StoreError> {
        if ids.is_empty() {
            return Ok(HashSet::new());
        }

        let point_ids: Vec<PointId> = ids.iter().map(|u| u.to_string().into()).collect();
        let resp = self
            .client
            .get_points(
                GetPointsBuilder::new(&self.collection, point_ids)
                    .with_payload(false)
                    .with_vectors(false),
            )
            .await
            .map_err(|e| StoreError::Qdrant(format!("get_points: {e}")))?;

        Ok(resp
            .result
            .into_iter()
            .filter_map(|p| p.id.map(point_id_to_string))
            .collect())
    }

    /// Upserts a batch of points: `(id, vector, record)`.
    ///
    /// The vector length must equal the configured dimensionality. Returns
    /// the number of points sent.
    ///
    /// # Errors
    /// - [`StoreError::VectorSizeMismatch`] if any vector has the wrong size.
    /// - [`StoreError::Qdrant`] on transport/server errors.
    pub async fn upsert_points(
        &self,
        batch: Vec<(Uuid, Vec<f32>, QaRecord)>,
    ) -> Result<usize, StoreError> {
        if batch.is_empty() {
            debug!("No points provided for upsert");
            return Ok(0);
        }

        let mut points: Vec<PointStruct> = Vec::with_capacity(batch.len());
        for (id, vector, record) in batch {
            if vector.len() != self.vector_dim {
                return Err(StoreError::VectorSizeMismatch {
                    got: vector.len(),
                    want: self.vector_dim,
                });
            }
            let payload = record_to_payload(&record)?;
            points.push(PointStruct::new(id.to_string(), vector, payload));
        }

        let count = points.len();
        info!(
            "Upserting {} points into collection '{}'",
            count, self.collection
        );

        self.client
            .upsert_points(UpsertPointsBuilder::new(&self.collection, points))
            .await
            .map_err(|e| StoreError::Qdrant(format!("upsert_points: {e}")))?;

        Ok(count)
    }

    /// Performs a similarity search in Qdrant.
    ///
    /// Returns `(id, score, payload)` tuples in the order the store reported
    /// them. The optional threshold is pushed down to the server.
    ///
    /// # Errors
    /// - [`StoreError::VectorSizeMismatch`] if the query vector size mismatches.
    /// - [`StoreError::Qdrant`] on transport/server errors.
    pub async fn search(
        &self,
        vector: Vec<f32>,
        limit: usize,
        score_threshold: Option<f32>,
    ) -> Result<Vec<(String, f32, serde_json::Value)>, StoreError> {
        if vector.len() != self.vector_dim {
            return Err(StoreError::VectorSizeMismatch {
                got: vector.len(),
                want: self.vector_dim,
            });
        }

        info!(
            "Searching in '{}' with limit={} threshold={:?}",
            self.collection, limit, score_threshold
        );

        let mut builder =
            SearchPointsBuilder::new(&self.collection, vector, limit as u64).with_payload(true);
        if let Some(t) = score_threshold {
            builder = builder.score_threshold(t);
        }

        let res = self
            .client
            .search_points(builder)
            .await
            .map_err(|e| StoreError::Qdrant(format!("search_points: {e}")))?;

        let mut out = Vec::with_capacity(res.result.len());
        for r in res.result.into_iter() {
            let id = r.id.map(point_id_to_string).unwrap_or_default();
            let payload_json = qpayload_to_json(r.payload);
            out.push((id, r.score, payload_json));
        }

        debug!("Search completed: {} hits returned", out.len());
        Ok(out)
    }
}

impl VectorStore for QdrantFacade {
    fn search<'a>(
        &'a self,
        vector: Vec<f32>,
        limit: usize,
        score_threshold: Option<f32>,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<RawHit>, StoreError>> + Send + 'a>> {
        Box::pin(QdrantFacade::search(self, vector, limit, score_threshold))
    }

    fn upsert_points<'a>(
        &'a self,
        batch: Vec<(Uuid, Vec<f32>, QaRecord)>,
    ) -> Pin<Box<dyn Future<Output = Result<usize, StoreError>> + Send + 'a>> {
        Box::pin(QdrantFacade::upsert_points(self, batch))
    }

    fn existing_ids<'a>(
        &'a self,
        ids: &'a [Uuid],
    ) -> Pin<Box<dyn Future<Output = Result<HashSet<String>, StoreError>> + Send + 'a>> {
        Box::pin(QdrantFacade::existing_ids(self, ids))
    }
}

/// Converts a [`QaRecord`] into a Qdrant [`Payload`].
///
/// Serializes to JSON and then `try_into()` → `Payload` as recommended by
/// the client.
fn record_to_payload(record: &QaRecord) -> Result<Payload, StoreError> {
    let as_json = json!({
        "keyword": record.keyword,
        "pregunta": record.pregunta,
        "respuesta": record.respuesta,
    });
    as_json
        .try_into()
        .map_err(|e| StoreError::Qdrant(format!("payload convert: {e}")))
}

/// Extracts a stable string form from a Qdrant point id.
fn point_id_to_string(pid: PointId) -> String {
    match pid.point_id_options {
        Some(qdrant_client::qdrant::point_id::PointIdOptions::Uuid(s)) => s,
        Some(qdrant_client::qdrant::point_id::PointIdOptions::Num(n)) => n.to_string(),
        None => String::new(),
    }
}

/// Converts a Qdrant payload (`HashMap<String, qdrant::Value>`) into JSON.
///
/// Unsupported nested objects/arrays are mapped to `Null`; the Q&A payload
/// is flat strings only.
fn qpayload_to_json(mut p: std::collections::HashMap<String, QValue>) -> serde_json::Value {
    use qdrant_client::qdrant::value::Kind as K;
    let mut m = serde_json::Map::new();
    for (k, v) in p.drain() {
        let j = match v.kind {
            Some(K::StringValue(s)) => serde_json::Value::String(s),
            Some(K::IntegerValue(i)) => serde_json::Value::Number(i.into()),
            Some(K::DoubleValue(f)) => serde_json::json!(f),
            Some(K::BoolValue(b)) => serde_json::Value::Bool(b),
            None => serde_json::Value::Null,
            // For unsupported nested types, fallback to Null for safety.
            _ => serde_json::Value::Null,
        };
        m.insert(k, j);
    }
    serde_json::Value::Object(m)
}
