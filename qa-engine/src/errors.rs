//! Unified error type for the answering engine.
//!
//! The four per-request kinds (embedding, retrieval, generation, parse) stay
//! distinct so the transport layer can map them to different responses. A
//! refusal (`puede_responder = false`) is never an error.

use qa_store::StoreError;
use thiserror::Error;

/// Top-level error for qa-engine operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A request or record failed field validation.
    #[error("[QA Engine] validation error: {0}")]
    Validation(String),

    /// Startup/configuration problems.
    #[error("[QA Engine] config error: {0}")]
    Config(String),

    /// The embedding provider failed or returned a malformed vector.
    #[error("[QA Engine] embedding error: {0}")]
    Embedding(String),

    /// The vector store failed during search or upsert.
    #[error("[QA Engine] retrieval error: {0}")]
    Retrieval(String),

    /// The completion provider failed to produce output.
    #[error("[QA Engine] generation error: {0}")]
    Generation(String),

    /// The model produced output that does not match the answer schema.
    #[error("[QA Engine] generation parse error: {0}")]
    GenerationParse(String),
}

impl From<StoreError> for EngineError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Validation(m) => EngineError::Validation(m),
            StoreError::Config(m) => EngineError::Config(m),
            StoreError::Embedding(m) => EngineError::Embedding(m),
            e @ StoreError::VectorSizeMismatch { .. } => EngineError::Embedding(e.to_string()),
            StoreError::Qdrant(m) => EngineError::Retrieval(m),
            // Dataset-file problems surface as validation of the input.
            e @ (StoreError::Io(_) | StoreError::Parse(_)) => EngineError::Validation(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_keep_their_kind() {
        let e: EngineError = StoreError::Qdrant("down".into()).into();
        assert!(matches!(e, EngineError::Retrieval(_)));

        let e: EngineError = StoreError::VectorSizeMismatch { got: 8, want: 3072 }.into();
        assert!(matches!(e, EngineError::Embedding(_)));

        let e: EngineError = StoreError::Validation("pregunta vacía".into()).into();
        assert!(matches!(e, EngineError::Validation(_)));
    }
}
