use std::sync::Arc;

use llm_service::config::{LlmModelConfig, config_openai_completion, config_openai_embedding};
use llm_service::health::HealthService;
use llm_service::openai::OpenAiService;
use qa_engine::engine::{Completions, OpenAiCompletions, QaEngine};
use qa_store::embed::OpenAiEmbedder;
use qa_store::{Embedder, QdrantFacade, SearchConfig, StoreConfig, VectorStore};

use crate::error_handler::AppError;

/// Shared state for all HTTP handlers.
pub struct AppState {
    /// The full answering/ingestion pipeline.
    pub engine: QaEngine,
    /// Direct store access for the health probe.
    pub facade: Arc<QdrantFacade>,
    /// Provider reachability probe.
    pub health: HealthService,
    /// Completion profile, reported by the health endpoint.
    pub completion_cfg: LlmModelConfig,
}

impl AppState {
    /// Load shared state from environment variables.
    ///
    /// Anything invalid or missing fails here, at startup, never per request.
    pub fn from_env() -> Result<Self, AppError> {
        let completion_cfg =
            config_openai_completion().map_err(|e| AppError::Config(e.to_string()))?;
        let embedding_cfg =
            config_openai_embedding().map_err(|e| AppError::Config(e.to_string()))?;

        let completion_svc = Arc::new(
            OpenAiService::new(completion_cfg.clone())
                .map_err(|e| AppError::Config(e.to_string()))?,
        );
        let embedding_svc = Arc::new(
            OpenAiService::new(embedding_cfg).map_err(|e| AppError::Config(e.to_string()))?,
        );

        let store_cfg = StoreConfig::from_env().map_err(|e| AppError::Config(e.to_string()))?;
        let search_cfg = SearchConfig::from_env().map_err(|e| AppError::Config(e.to_string()))?;

        let facade = Arc::new(
            QdrantFacade::new(&store_cfg).map_err(|e| AppError::Config(e.to_string()))?,
        );
        let embedder: Arc<dyn Embedder> =
            Arc::new(OpenAiEmbedder::new(embedding_svc, store_cfg.vector_dim));
        let completions: Arc<dyn Completions> = Arc::new(OpenAiCompletions::new(completion_svc));

        let health = HealthService::new(completion_cfg.timeout_secs)
            .map_err(|e| AppError::Config(e.to_string()))?;

        // The engine sees the facade through its store seam; the health
        // probe keeps the concrete handle for pinging.
        let store: Arc<dyn VectorStore> = facade.clone();
        let engine = QaEngine::new(store, embedder, completions, store_cfg, search_cfg);

        Ok(Self {
            engine,
            facade,
            health,
            completion_cfg,
        })
    }
}
