//! Request/response value objects for the answering engine.

use qa_store::SearchResult;
use serde::{Deserialize, Serialize};

use crate::errors::EngineError;

/// An incoming question, optionally with conversational context.
#[derive(Clone, Debug, Deserialize)]
pub struct QueryRequest {
    /// The user's question.
    pub consulta: String,
    /// Summary of previous conversations, if any.
    #[serde(default)]
    pub contexto_previo: Option<String>,
    /// Running context of the current conversation, if any.
    #[serde(default)]
    pub contexto_actual: Option<String>,
}

impl QueryRequest {
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.consulta.trim().is_empty() {
            return Err(EngineError::Validation(
                "consulta must not be empty".into(),
            ));
        }
        Ok(())
    }
}

/// The model's structured answer: the confidence flag plus the text.
///
/// Both fields are mandatory; a reply missing either is a parse failure,
/// never silently defaulted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeneratedAnswer {
    /// Whether the evidence was sufficient to answer.
    pub puede_responder: bool,
    /// The answer text, or a polite refusal when `puede_responder` is false.
    pub respuesta: String,
}

/// Everything a query run produced: answer, evidence and timing.
#[derive(Clone, Debug, Serialize)]
pub struct QueryOutcome {
    pub generated: GeneratedAnswer,
    /// The retrieved evidence, ranked by score.
    pub matches: Vec<SearchResult>,
    pub elapsed_ms: u128,
}

/// Reachability of the two external collaborators.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct HealthReport {
    pub store_reachable: bool,
    pub provider_reachable: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_request_rejects_blank_consulta() {
        let req = QueryRequest {
            consulta: "   ".into(),
            contexto_previo: None,
            contexto_actual: None,
        };
        assert!(matches!(req.validate(), Err(EngineError::Validation(_))));
    }

    #[test]
    fn query_request_context_fields_are_optional() {
        let req: QueryRequest =
            serde_json::from_str(r#"{"consulta":"¿Hay descuentos?"}"#).unwrap();
        assert!(req.validate().is_ok());
        assert!(req.contexto_previo.is_none());
        assert!(req.contexto_actual.is_none());
    }

    #[test]
    fn generated_answer_requires_both_fields() {
        let err = serde_json::from_str::<GeneratedAnswer>(r#"{"respuesta":"hola"}"#);
        assert!(err.is_err());
        let err = serde_json::from_str::<GeneratedAnswer>(r#"{"puede_responder":true}"#);
        assert!(err.is_err());
    }
}
