//! Embedding abstraction and the OpenAI-backed adapter.
//!
//! Async is required because real providers perform HTTP requests.

use std::sync::Arc;
use std::{future::Future, pin::Pin};

use futures::stream::{self, StreamExt};
use tracing::{debug, info};

use llm_service::openai::OpenAiService;

use crate::errors::StoreError;

/// Provider interface for embedding generation.
///
/// Implement this trait to plug in your own embedding backend, or a
/// deterministic double in tests.
pub trait Embedder: Send + Sync {
    /// Async embedding function.
    fn embed<'a>(
        &'a self,
        text: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<f32>, StoreError>> + Send + 'a>>;
}

/// OpenAI embedding provider (async).
///
/// Wraps the shared [`OpenAiService`] and enforces the expected vector
/// dimensionality so malformed provider output surfaces as
/// [`StoreError::VectorSizeMismatch`] instead of corrupting the collection.
#[derive(Clone)]
pub struct OpenAiEmbedder {
    svc: Arc<OpenAiService>,
    dim: usize,
}

impl OpenAiEmbedder {
    /// Construct a new embedder from the shared service and the expected
    /// embedding dimension.
    pub fn new(svc: Arc<OpenAiService>, dim: usize) -> Self {
        Self { svc, dim }
    }
}

impl Embedder for OpenAiEmbedder {
    fn embed<'a>(
        &'a self,
        text: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<f32>, StoreError>> + Send + 'a>> {
        Box::pin(async move {
            let vector = self
                .svc
                .embed(text)
                .await
                .map_err(|e| StoreError::Embedding(e.to_string()))?;

            if vector.len() != self.dim {
                return Err(StoreError::VectorSizeMismatch {
                    got: vector.len(),
                    want: self.dim,
                });
            }

            Ok(vector)
        })
    }
}

/// Embeds a slice of texts with bounded concurrency, preserving input order.
///
/// # Errors
/// Fails on the first provider error; partial results are discarded so a
/// batch is either fully embedded or not embedded at all.
pub async fn embed_batch(
    texts: &[String],
    provider: &dyn Embedder,
    concurrency: usize,
) -> Result<Vec<Vec<f32>>, StoreError> {
    info!(
        total = texts.len(),
        concurrency, "embed::embed_batch: start"
    );

    if texts.is_empty() {
        return Ok(Vec::new());
    }

    let futs: Vec<
        Pin<Box<dyn Future<Output = Result<(usize, Vec<f32>), StoreError>> + Send + '_>>,
    > = texts
        .iter()
        .enumerate()
        .map(|(i, text)| {
            let fut: Pin<
                Box<dyn Future<Output = Result<(usize, Vec<f32>), StoreError>> + Send + '_>,
            > = Box::pin(async move {
                let v = provider.embed(text).await?;
                Ok((i, v))
            });
            fut
        })
        .collect();

    let mut results: Vec<(usize, Vec<f32>)> = stream::iter(futs)
        .buffer_unordered(concurrency.max(1))
        .collect::<Vec<_>>()
        .await
        .into_iter()
        .collect::<Result<Vec<_>, StoreError>>()?;

    results.sort_by_key(|(i, _)| *i);

    debug!("embed::embed_batch: embeddings filled");
    Ok(results.into_iter().map(|(_, v)| v).collect())
}


#[cfg(test)]
mod tests {
    use super::test_support::StubEmbedder;
    use super::*;

    #[tokio::test]
    async fn batch_preserves_order() {
        let provider = StubEmbedder { dim: 3, fail: false };
        let texts: Vec<String> = vec!["a".into(), "abc".into(), "ab".into()];
        let out = embed_batch(&texts, &provider, 2).await.unwrap();
        assert_eq!(out.len(), 3);
        assert_eq!(out[0][0], 1.0);
        assert_eq!(out[1][0], 3.0);
        assert_eq!(out[2][0], 2.0);
    }

    #[tokio::test]
    async fn batch_fails_atomically() {
        let provider = StubEmbedder { dim: 3, fail: true };
        let texts: Vec<String> = vec!["a".into(), "b".into()];
        let err = embed_batch(&texts, &provider, 2).await.unwrap_err();
        assert!(matches!(err, StoreError::Embedding(_)));
    }
}
