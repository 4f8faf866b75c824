//! The answering engine: retrieval, synthesis and the operational surface.

use std::path::Path;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Instant;

use llm_service::config::LlmModelConfig;
use llm_service::health::HealthService;
use llm_service::openai::OpenAiService;
use qa_store::{
    Embedder, IngestionReport, ItemStatus, QaRecord, QdrantFacade, SearchConfig, SearchResult,
    StoreConfig, VectorStore, ingest, retrieve,
};
use tracing::{debug, info};
use uuid::Uuid;

use crate::errors::EngineError;
use crate::parse::parse_generated;
use crate::prompt::{generation_prompt, system_prompt};
use crate::types::{GeneratedAnswer, HealthReport, QueryOutcome, QueryRequest};

/// Seam for JSON-mode chat completions, test-double friendly.
pub trait Completions: Send + Sync {
    /// Runs a chat completion constrained to a single JSON object and
    /// returns the raw message content.
    fn complete_json<'a>(
        &'a self,
        system: &'a str,
        user: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, EngineError>> + Send + 'a>>;
}

/// [`Completions`] backed by the OpenAI chat API.
pub struct OpenAiCompletions {
    svc: Arc<OpenAiService>,
}

impl OpenAiCompletions {
    pub fn new(svc: Arc<OpenAiService>) -> Self {
        Self { svc }
    }
}

impl Completions for OpenAiCompletions {
    fn complete_json<'a>(
        &'a self,
        system: &'a str,
        user: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, EngineError>> + Send + 'a>> {
        Box::pin(async move {
            self.svc
                .complete_json(system, user)
                .await
                .map_err(|e| EngineError::Generation(e.to_string()))
        })
    }
}

/// Orchestrates the full question-answering pipeline over the store.
///
/// All three collaborators sit behind traits, so the pipeline can run
/// against in-memory doubles in tests.
pub struct QaEngine {
    store: Arc<dyn VectorStore>,
    embedder: Arc<dyn Embedder>,
    completions: Arc<dyn Completions>,
    store_cfg: StoreConfig,
    search_cfg: SearchConfig,
}

impl QaEngine {
    pub fn new(
        store: Arc<dyn VectorStore>,
        embedder: Arc<dyn Embedder>,
        completions: Arc<dyn Completions>,
        store_cfg: StoreConfig,
        search_cfg: SearchConfig,
    ) -> Self {
        Self {
            store,
            embedder,
            completions,
            store_cfg,
            search_cfg,
        }
    }

    /// Answers a query: retrieve evidence, synthesize, gate by confidence.
    ///
    /// An empty store (or nothing above the score threshold) is not an
    /// error: the model sees the no-evidence marker and refuses.
    pub async fn answer(&self, req: QueryRequest) -> Result<QueryOutcome, EngineError> {
        req.validate()?;
        let started = Instant::now();

        let matches = retrieve::search(
            self.store.as_ref(),
            self.embedder.as_ref(),
            &req.consulta,
            self.search_cfg.limit,
            self.search_cfg.score_threshold,
        )
        .await?;
        debug!(hits = matches.len(), "Evidence retrieved");

        let generated = synthesize(
            self.completions.as_ref(),
            &req.consulta,
            &matches,
            req.contexto_previo.as_deref(),
            req.contexto_actual.as_deref(),
        )
        .await?;

        let elapsed_ms = started.elapsed().as_millis();
        info!(
            hits = matches.len(),
            puede_responder = generated.puede_responder,
            latency_ms = elapsed_ms,
            "Query answered"
        );
        Ok(QueryOutcome {
            generated,
            matches,
            elapsed_ms,
        })
    }

    /// Stores one Q&A item; validation failures store nothing.
    ///
    /// Returns the deterministic id the record was stored under.
    pub async fn add_item(&self, record: QaRecord) -> Result<(Uuid, ItemStatus), EngineError> {
        let stored = ingest::add_item(
            self.store.as_ref(),
            self.embedder.as_ref(),
            &self.store_cfg,
            record,
        )
        .await?;
        Ok(stored)
    }

    /// Batch-ingests records; see [`qa_store::ingest::ingest`].
    pub async fn ingest(&self, records: Vec<QaRecord>) -> Result<IngestionReport, EngineError> {
        let report = ingest::ingest(
            self.store.as_ref(),
            self.embedder.as_ref(),
            &self.store_cfg,
            records,
        )
        .await?;
        Ok(report)
    }

    /// Ingests a JSON dataset file.
    pub async fn ingest_file(
        &self,
        path: impl AsRef<Path>,
    ) -> Result<IngestionReport, EngineError> {
        let report = ingest::ingest_file(
            self.store.as_ref(),
            self.embedder.as_ref(),
            &self.store_cfg,
            path,
        )
        .await?;
        Ok(report)
    }
}

/// Compose prompts, call the model once (no retries) and parse the answer.
async fn synthesize(
    completions: &dyn Completions,
    consulta: &str,
    matches: &[SearchResult],
    contexto_previo: Option<&str>,
    contexto_actual: Option<&str>,
) -> Result<GeneratedAnswer, EngineError> {
    let system = system_prompt(None);
    let user = generation_prompt(consulta, matches, contexto_previo, contexto_actual);
    let raw = completions.complete_json(&system, &user).await?;
    parse_generated(&raw)
}

/// Probes both collaborators; never fails, only reports.
pub async fn health(
    facade: &QdrantFacade,
    probe: &HealthService,
    completion_cfg: &LlmModelConfig,
) -> HealthReport {
    let store_reachable = facade.ping().await;
    let provider = probe.check(completion_cfg).await;
    if !store_reachable || !provider.ok {
        debug!(
            store_reachable,
            provider_reachable = provider.ok,
            provider_message = %provider.message,
            "Health probe found a degraded collaborator"
        );
    }
    HealthReport {
        store_reachable,
        provider_reachable: provider.ok,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::REFUSAL_FALLBACK;
    use qa_store::{DistanceKind, StoreError};
    use serde_json::json;
    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;

    /// Canned completion that records the prompts it was given.
    struct StubCompletions {
        reply: String,
        seen_user: Mutex<Vec<String>>,
    }

    impl StubCompletions {
        fn new(reply: &str) -> Self {
            Self {
                reply: reply.into(),
                seen_user: Mutex::new(Vec::new()),
            }
        }
    }

    impl Completions for StubCompletions {
        fn complete_json<'a>(
            &'a self,
            _system: &'a str,
            user: &'a str,
        ) -> Pin<Box<dyn Future<Output = Result<String, EngineError>> + Send + 'a>> {
            self.seen_user.lock().unwrap().push(user.to_string());
            let reply = self.reply.clone();
            Box::pin(async move { Ok(reply) })
        }
    }

    fn result(position: usize, pregunta: &str, respuesta: &str) -> SearchResult {
        SearchResult {
            id: format!("id-{position}"),
            keyword: "planes".into(),
            pregunta: pregunta.into(),
            respuesta: respuesta.into(),
            score: 0.9 - position as f32 * 0.1,
            position,
        }
    }

    #[tokio::test]
    async fn synthesize_feeds_evidence_and_parses_the_answer() {
        let stub = StubCompletions::new(
            r#"{"puede_responder": true, "respuesta": "El Pack Completo añade las funciones premium que el Básico no incluye."}"#,
        );
        let matches = vec![
            result(0, "¿Qué incluye el Pack Completo?", "Todas las funciones premium."),
            result(1, "¿Qué incluye el Pack Básico?", "Las funciones esenciales."),
        ];

        let answer = synthesize(
            &stub,
            "¿Qué diferencia hay entre el Pack Completo y el Básico?",
            &matches,
            None,
            None,
        )
        .await
        .unwrap();

        assert!(answer.puede_responder);
        assert!(answer.respuesta.contains("Pack Completo"));

        let seen = stub.seen_user.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].contains("Documento 1:"));
        assert!(seen[0].contains("Pack Básico"));
    }

    #[tokio::test]
    async fn zero_evidence_still_reaches_the_model_and_refusal_is_success() {
        let stub = StubCompletions::new(r#"{"puede_responder": false, "respuesta": ""}"#);

        let answer = synthesize(&stub, "¿Hacéis envíos a Marte?", &[], None, None)
            .await
            .unwrap();

        assert!(!answer.puede_responder);
        assert_eq!(answer.respuesta, REFUSAL_FALLBACK);

        let seen = stub.seen_user.lock().unwrap();
        assert!(seen[0].contains("No se encontraron documentos relevantes"));
    }

    #[tokio::test]
    async fn malformed_model_output_is_a_generation_parse_error() {
        let stub = StubCompletions::new("no soy JSON");
        let err = synthesize(&stub, "hola", &[], None, None).await.unwrap_err();
        assert!(matches!(err, EngineError::GenerationParse(_)));
    }

    #[tokio::test]
    async fn conversation_context_is_forwarded() {
        let stub = StubCompletions::new(r#"{"puede_responder": true, "respuesta": "ok"}"#);
        synthesize(
            &stub,
            "¿y el precio?",
            &[result(0, "¿Cuánto cuesta?", "99€ al año.")],
            Some("El usuario preguntó por el Pack Completo."),
            Some("Hablamos de la renovación anual."),
        )
        .await
        .unwrap();

        let seen = stub.seen_user.lock().unwrap();
        assert!(seen[0].contains("El usuario preguntó por el Pack Completo."));
        assert!(seen[0].contains("Hablamos de la renovación anual."));
    }

    /// Deterministic embedder: same text, same vector.
    struct HashEmbedder;

    impl Embedder for HashEmbedder {
        fn embed<'a>(
            &'a self,
            text: &'a str,
        ) -> Pin<Box<dyn Future<Output = Result<Vec<f32>, StoreError>> + Send + 'a>> {
            let len = text.chars().count() as f32;
            let sum = text.bytes().map(|b| b as f32).sum::<f32>();
            Box::pin(async move { Ok(vec![len, sum % 251.0, 7.0]) })
        }
    }

    /// In-memory store: exact-match vectors score 1.0, others decay with distance.
    struct MemoryStore {
        points: Mutex<HashMap<String, (Vec<f32>, QaRecord)>>,
        fail: bool,
    }

    impl MemoryStore {
        fn new() -> Self {
            Self {
                points: Mutex::new(HashMap::new()),
                fail: false,
            }
        }

        fn len(&self) -> usize {
            self.points.lock().unwrap().len()
        }
    }

    impl VectorStore for MemoryStore {
        fn search<'a>(
            &'a self,
            vector: Vec<f32>,
            limit: usize,
            score_threshold: Option<f32>,
        ) -> Pin<
            Box<
                dyn Future<Output = Result<Vec<(String, f32, serde_json::Value)>, StoreError>>
                    + Send
                    + 'a,
            >,
        > {
            Box::pin(async move {
                if self.fail {
                    return Err(StoreError::Qdrant("store down".into()));
                }
                let points = self.points.lock().unwrap();
                let mut hits: Vec<(String, f32, serde_json::Value)> = points
                    .iter()
                    .map(|(id, (stored, rec))| {
                        let dist = stored
                            .iter()
                            .zip(&vector)
                            .map(|(a, b)| (a - b).powi(2))
                            .sum::<f32>()
                            .sqrt();
                        let payload = json!({
                            "keyword": rec.keyword,
                            "pregunta": rec.pregunta,
                            "respuesta": rec.respuesta,
                        });
                        (id.clone(), 1.0 / (1.0 + dist), payload)
                    })
                    .collect();
                hits.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap());
                if let Some(t) = score_threshold {
                    hits.retain(|h| h.1 >= t);
                }
                hits.truncate(limit);
                Ok(hits)
            })
        }

        fn upsert_points<'a>(
            &'a self,
            batch: Vec<(Uuid, Vec<f32>, QaRecord)>,
        ) -> Pin<Box<dyn Future<Output = Result<usize, StoreError>> + Send + 'a>> {
            Box::pin(async move {
                if self.fail {
                    return Err(StoreError::Qdrant("store down".into()));
                }
                let count = batch.len();
                let mut points = self.points.lock().unwrap();
                for (id, vector, record) in batch {
                    points.insert(id.to_string(), (vector, record));
                }
                Ok(count)
            })
        }

        fn existing_ids<'a>(
            &'a self,
            ids: &'a [Uuid],
        ) -> Pin<Box<dyn Future<Output = Result<HashSet<String>, StoreError>> + Send + 'a>>
        {
            Box::pin(async move {
                if self.fail {
                    return Err(StoreError::Qdrant("store down".into()));
                }
                let points = self.points.lock().unwrap();
                Ok(ids
                    .iter()
                    .map(|u| u.to_string())
                    .filter(|k| points.contains_key(k))
                    .collect())
            })
        }
    }

    fn record(keyword: &str, pregunta: &str, respuesta: &str) -> QaRecord {
        QaRecord {
            keyword: keyword.into(),
            pregunta: pregunta.into(),
            respuesta: respuesta.into(),
        }
    }

    fn engine_over(store: Arc<MemoryStore>, reply: &str) -> QaEngine {
        let store_cfg = StoreConfig {
            qdrant_url: "http://localhost:6334".into(),
            qdrant_api_key: None,
            collection: "qa_items".into(),
            distance: DistanceKind::Cosine,
            vector_dim: 3,
            upsert_batch: 2,
            embed_concurrency: 2,
            embed_with_answer: false,
        };
        let search_cfg = SearchConfig {
            limit: 5,
            score_threshold: 0.5,
        };
        QaEngine::new(
            store,
            Arc::new(HashEmbedder),
            Arc::new(StubCompletions::new(reply)),
            store_cfg,
            search_cfg,
        )
    }

    #[tokio::test]
    async fn answer_retrieves_what_add_item_stored() {
        let store = Arc::new(MemoryStore::new());
        let engine = engine_over(
            Arc::clone(&store),
            r#"{"puede_responder": true, "respuesta": "El Pack Completo incluye todas las funciones premium."}"#,
        );

        let (id, status) = engine
            .add_item(record(
                "planes",
                "¿Qué incluye el Pack Completo?",
                "Todas las funciones premium.",
            ))
            .await
            .unwrap();
        assert_eq!(status, ItemStatus::Inserted);

        let outcome = engine
            .answer(QueryRequest {
                consulta: "¿Qué incluye el Pack Completo?".into(),
                contexto_previo: None,
                contexto_actual: None,
            })
            .await
            .unwrap();

        assert!(outcome.generated.puede_responder);
        assert_eq!(outcome.matches.len(), 1);
        assert_eq!(outcome.matches[0].id, id.to_string());
        assert_eq!(outcome.matches[0].pregunta, "¿Qué incluye el Pack Completo?");
    }

    #[tokio::test]
    async fn reingesting_through_the_engine_keeps_the_store_size() {
        let store = Arc::new(MemoryStore::new());
        let engine = engine_over(
            Arc::clone(&store),
            r#"{"puede_responder": true, "respuesta": "ok"}"#,
        );
        let records = vec![
            record("planes", "¿Qué incluye el Pack Completo?", "Todo."),
            record("precios", "¿Hay descuentos anuales?", "Sí."),
        ];

        let first = engine.ingest(records.clone()).await.unwrap();
        assert_eq!(first.inserted, 2);

        let second = engine.ingest(records).await.unwrap();
        assert_eq!(second.inserted, 0);
        assert_eq!(second.updated, 2);
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn store_failure_surfaces_as_a_retrieval_error() {
        let store = Arc::new(MemoryStore {
            points: Mutex::new(HashMap::new()),
            fail: true,
        });
        let engine = engine_over(store, r#"{"puede_responder": true, "respuesta": "ok"}"#);

        let err = engine
            .answer(QueryRequest {
                consulta: "¿Hay descuentos?".into(),
                contexto_previo: None,
                contexto_actual: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Retrieval(_)));
    }
}
