//! Core data models used by the library.

use serde::{Deserialize, Serialize};

use crate::errors::StoreError;

/// Canonical Q&A record as stored in Qdrant payloads and read from datasets.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct QaRecord {
    /// Category label, e.g. "planes".
    pub keyword: String,
    /// Question text.
    pub pregunta: String,
    /// Answer text associated with the question.
    pub respuesta: String,
}

impl QaRecord {
    /// Checks that all three fields are non-empty strings.
    ///
    /// # Errors
    /// Returns [`StoreError::Validation`] naming the offending field.
    pub fn validate(&self) -> Result<(), StoreError> {
        for (name, value) in [
            ("keyword", &self.keyword),
            ("pregunta", &self.pregunta),
            ("respuesta", &self.respuesta),
        ] {
            if value.trim().is_empty() {
                return Err(StoreError::Validation(format!(
                    "field '{name}' must be a non-empty string"
                )));
            }
        }
        Ok(())
    }

    /// Text used for embedding generation: the question alone, or the
    /// question concatenated with the answer when `with_answer` is set.
    pub fn embedding_text(&self, with_answer: bool) -> String {
        if with_answer {
            format!("{} {}", self.pregunta.trim(), self.respuesta.trim())
        } else {
            self.pregunta.trim().to_string()
        }
    }
}

/// A single retrieval hit (ranked by similarity), ephemeral per query.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SearchResult {
    /// Point id in the collection.
    pub id: String,
    /// Category label of the matched item.
    pub keyword: String,
    /// Matched question text.
    pub pregunta: String,
    /// Stored answer text.
    pub respuesta: String,
    /// Similarity score reported by the store.
    pub score: f32,
    /// Zero-based rank after sorting.
    pub position: usize,
}
