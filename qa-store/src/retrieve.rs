//! Retrieval engine: embed a query, run the vector search, rank the hits.

use tracing::{debug, trace};

use crate::embed::Embedder;
use crate::errors::StoreError;
use crate::record::SearchResult;
use crate::store::VectorStore;

/// Embeds `query_text` and returns ranked, threshold-filtered results.
///
/// The threshold is pushed down to Qdrant and applied again locally, so the
/// contract holds even if the server ignores it. Results come back in
/// non-increasing score order; ties keep the store's original order.
///
/// # Errors
/// - [`StoreError::Embedding`] / [`StoreError::VectorSizeMismatch`] from the provider.
/// - [`StoreError::Qdrant`] on store failures.
pub async fn search(
    store: &dyn VectorStore,
    embedder: &dyn Embedder,
    query_text: &str,
    limit: usize,
    score_threshold: f32,
) -> Result<Vec<SearchResult>, StoreError> {
    trace!("retrieve::search limit={limit} threshold={score_threshold}");

    let vector = embedder.embed(query_text).await?;
    let hits = store
        .search(vector, limit, Some(score_threshold))
        .await?;

    let results = rank_hits(hits, score_threshold);
    debug!("retrieve::search hits={}", results.len());
    Ok(results)
}

/// Ranks raw `(id, score, payload)` hits into [`SearchResult`]s.
///
/// - Drops hits scoring strictly below `score_threshold`.
/// - Stable sort by descending score (ties keep input order).
/// - Assigns zero-based positions after sorting.
pub fn rank_hits(
    hits: Vec<(String, f32, serde_json::Value)>,
    score_threshold: f32,
) -> Vec<SearchResult> {
    let mut kept: Vec<(String, f32, serde_json::Value)> = hits
        .into_iter()
        .filter(|(_, score, _)| *score >= score_threshold)
        .collect();

    kept.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    kept.into_iter()
        .enumerate()
        .map(|(position, (id, score, payload))| SearchResult {
            id,
            keyword: str_field(&payload, "keyword"),
            pregunta: str_field(&payload, "pregunta"),
            respuesta: str_field(&payload, "respuesta"),
            score,
            position,
        })
        .collect()
}

fn str_field(payload: &serde_json::Value, key: &str) -> String {
    payload
        .get(key)
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string()
}
