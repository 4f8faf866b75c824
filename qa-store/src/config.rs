//! Runtime and collection configuration.
//!
//! Reads settings from environment variables and exposes strongly typed
//! configs for the Qdrant connection and search behavior.

use crate::errors::StoreError;

/// Distance function used for the vector space.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DistanceKind {
    /// Cosine distance (recommended for most embeddings).
    Cosine,
    /// Dot product (useful for normalized vectors).
    Dot,
    /// Euclidean distance (L2).
    Euclid,
}

impl DistanceKind {
    /// Parse from env string (case-insensitive). Defaults to Cosine.
    pub fn from_env(s: Option<String>) -> Self {
        match s
            .unwrap_or_else(|| "Cosine".to_string())
            .to_lowercase()
            .as_str()
        {
            "cosine" => DistanceKind::Cosine,
            "dot" | "dotproduct" => DistanceKind::Dot,
            "euclid" | "l2" => DistanceKind::Euclid,
            _ => DistanceKind::Cosine,
        }
    }
}

/// Configuration for Qdrant connectivity and ingestion behavior.
#[derive(Clone, Debug)]
pub struct StoreConfig {
    /// Qdrant gRPC endpoint, e.g. `http://localhost:6334`.
    pub qdrant_url: String,
    /// Optional API key for Qdrant Cloud.
    pub qdrant_api_key: Option<String>,
    /// Target collection name.
    pub collection: String,
    /// Distance function (Cosine by default).
    pub distance: DistanceKind,
    /// Embedding vector dimensionality (e.g., 3072 for text-embedding-3-large).
    pub vector_dim: usize,
    /// Upsert batch size for ingestion.
    pub upsert_batch: usize,
    /// Max concurrent embedding requests during ingestion.
    pub embed_concurrency: usize,
    /// Embed `"{pregunta} {respuesta}"` instead of the question alone.
    pub embed_with_answer: bool,
}

impl StoreConfig {
    /// Build configuration from environment variables.
    ///
    /// Environment variables used:
    /// - `QDRANT_URL` (default: "http://localhost:6334")
    /// - `QDRANT_API_KEY` (optional)
    /// - `QDRANT_COLLECTION` (default: "qa_items")
    /// - `QDRANT_DISTANCE` (values: "Cosine" | "Dot" | "Euclid"; default: "Cosine")
    /// - `EMBEDDING_DIM` (default: 3072)
    /// - `UPSERT_BATCH_SIZE` (default: 64)
    /// - `EMBED_CONCURRENCY` (default: 4)
    /// - `EMBED_WITH_ANSWER` (default: true)
    pub fn from_env() -> Result<Self, StoreError> {
        let cfg = Self {
            qdrant_url: std::env::var("QDRANT_URL")
                .unwrap_or_else(|_| "http://localhost:6334".into()),
            qdrant_api_key: std::env::var("QDRANT_API_KEY")
                .ok()
                .filter(|s| !s.trim().is_empty()),
            collection: std::env::var("QDRANT_COLLECTION").unwrap_or_else(|_| "qa_items".into()),
            distance: DistanceKind::from_env(std::env::var("QDRANT_DISTANCE").ok()),
            vector_dim: read_usize_env("EMBEDDING_DIM")?.unwrap_or(3072),
            upsert_batch: read_usize_env("UPSERT_BATCH_SIZE")?.unwrap_or(64),
            embed_concurrency: read_usize_env("EMBED_CONCURRENCY")?.unwrap_or(4),
            embed_with_answer: read_bool_env("EMBED_WITH_ANSWER")?.unwrap_or(true),
        };
        cfg.validate()?;
        Ok(cfg)
    }

    /// Validates config values.
    pub fn validate(&self) -> Result<(), StoreError> {
        if self.qdrant_url.trim().is_empty() {
            return Err(StoreError::Config("qdrant_url is empty".into()));
        }
        if self.collection.trim().is_empty() {
            return Err(StoreError::Config("collection is empty".into()));
        }
        if self.vector_dim == 0 {
            return Err(StoreError::Config("EMBEDDING_DIM must be > 0".into()));
        }
        if self.upsert_batch == 0 {
            return Err(StoreError::Config("UPSERT_BATCH_SIZE must be > 0".into()));
        }
        Ok(())
    }
}

/// Search behavior knobs (result limit, score threshold).
#[derive(Clone, Copy, Debug)]
pub struct SearchConfig {
    /// Maximum candidates to request from the store.
    pub limit: usize,
    /// Minimum similarity score for a result to count as evidence.
    pub score_threshold: f32,
}

impl SearchConfig {
    /// Build from environment variables.
    ///
    /// - `QDRANT_SEARCH_LIMIT` (default: 5)
    /// - `QDRANT_SEARCH_SCORE_THRESHOLD` (default: 0.30)
    pub fn from_env() -> Result<Self, StoreError> {
        let cfg = Self {
            limit: read_usize_env("QDRANT_SEARCH_LIMIT")?.unwrap_or(5),
            score_threshold: read_f32_env("QDRANT_SEARCH_SCORE_THRESHOLD")?.unwrap_or(0.30),
        };
        if cfg.limit == 0 {
            return Err(StoreError::Config("QDRANT_SEARCH_LIMIT must be > 0".into()));
        }
        Ok(cfg)
    }
}

/// Read an optional `usize` from env, erroring on malformed values.
fn read_usize_env(key: &str) -> Result<Option<usize>, StoreError> {
    match std::env::var(key) {
        Ok(v) if !v.trim().is_empty() => v
            .parse::<usize>()
            .map(Some)
            .map_err(|_| StoreError::Config(format!("{key} = '{v}' is not a valid usize"))),
        _ => Ok(None),
    }
}

/// Read an optional `bool` from env, erroring on malformed values.
fn read_bool_env(key: &str) -> Result<Option<bool>, StoreError> {
    match std::env::var(key) {
        Ok(v) if !v.trim().is_empty() => v
            .parse::<bool>()
            .map(Some)
            .map_err(|_| StoreError::Config(format!("{key} = '{v}' is not a valid bool"))),
        _ => Ok(None),
    }
}

/// Read an optional `f32` from env, erroring on malformed values.
fn read_f32_env(key: &str) -> Result<Option<f32>, StoreError> {
    match std::env::var(key) {
        Ok(v) if !v.trim().is_empty() => v
            .parse::<f32>()
            .map(Some)
            .map_err(|_| StoreError::Config(format!("{key} = '{v}' is not a valid f32"))),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_rejects_zero_dim() {
        let cfg = StoreConfig {
            qdrant_url: "http://localhost:6334".into(),
            qdrant_api_key: None,
            collection: "qa_items".into(),
            distance: DistanceKind::Cosine,
            vector_dim: 0,
            upsert_batch: 64,
            embed_concurrency: 4,
            embed_with_answer: true,
        };
        assert!(matches!(cfg.validate(), Err(StoreError::Config(_))));
    }

    #[test]
    fn distance_parses_case_insensitively() {
        assert_eq!(DistanceKind::from_env(Some("dot".into())), DistanceKind::Dot);
        assert_eq!(DistanceKind::from_env(Some("L2".into())), DistanceKind::Euclid);
        assert_eq!(DistanceKind::from_env(None), DistanceKind::Cosine);
    }
}
