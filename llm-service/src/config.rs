//! Model configs loaded strictly from environment variables.
//!
//! Two roles are used by the Q&A pipeline:
//!
//! - **Completion** → grounded-answer synthesis (JSON mode)
//! - **Embedding**  → vector generation for ingestion and search
//!
//! # Environment variables
//!
//! Common:
//! - `OPENAI_API_KEY`  = API key (mandatory)
//! - `OPENAI_ENDPOINT` = API base URL (default `https://api.openai.com`)
//! - `LLM_TIMEOUT_SECS` = optional request timeout override
//!
//! Per role:
//! - `OPENAI_COMPLETION_MODEL` = completion model (mandatory)
//! - `OPENAI_EMBEDDING_MODEL`  = embedding model (mandatory)
//! - `LLM_MAX_TOKENS`          = optional completion token cap (default 800)

use crate::error_handler::{
    ConfigError, LlmError, env_opt_u32, env_opt_u64, must_env, validate_http_endpoint,
};

/// Default API base when `OPENAI_ENDPOINT` is not set.
pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com";

/// Configuration for a single OpenAI model invocation profile.
#[derive(Debug, Clone, PartialEq)]
pub struct LlmModelConfig {
    /// Model identifier string (e.g., `"gpt-4o-mini"`, `"text-embedding-3-large"`).
    pub model: String,

    /// API base URL (without the `/v1/...` suffix).
    pub endpoint: String,

    /// API key used for Bearer auth.
    pub api_key: String,

    /// Maximum number of tokens to generate (completions only).
    pub max_tokens: Option<u32>,

    /// Sampling temperature (completions only).
    pub temperature: Option<f32>,

    /// Optional request timeout (in seconds).
    pub timeout_secs: Option<u64>,
}

impl LlmModelConfig {
    /// Validates model name and endpoint scheme.
    ///
    /// # Errors
    /// Returns [`LlmError::Config`] for an empty model or malformed endpoint.
    pub fn validate(&self) -> Result<(), LlmError> {
        if self.model.trim().is_empty() {
            return Err(ConfigError::EmptyModel.into());
        }
        validate_http_endpoint("OPENAI_ENDPOINT", &self.endpoint)
    }
}

/// Resolves the OpenAI endpoint from `OPENAI_ENDPOINT`, defaulting to the
/// public API base.
fn openai_endpoint() -> String {
    std::env::var("OPENAI_ENDPOINT")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string())
}

/// Constructs the **completion** profile.
///
/// # Env
/// - `OPENAI_API_KEY`, `OPENAI_COMPLETION_MODEL` (required)
/// - `LLM_MAX_TOKENS`, `LLM_TIMEOUT_SECS` (optional)
///
/// # Defaults
/// - `temperature = Some(0.7)` (matches the answer-synthesis call)
/// - `max_tokens = Some(800)`
/// - `timeout_secs = Some(60)`
pub fn config_openai_completion() -> Result<LlmModelConfig, LlmError> {
    let cfg = LlmModelConfig {
        model: must_env("OPENAI_COMPLETION_MODEL")?,
        endpoint: openai_endpoint(),
        api_key: must_env("OPENAI_API_KEY")?,
        max_tokens: Some(env_opt_u32("LLM_MAX_TOKENS")?.unwrap_or(800)),
        temperature: Some(0.7),
        timeout_secs: Some(env_opt_u64("LLM_TIMEOUT_SECS")?.unwrap_or(60)),
    };
    cfg.validate()?;
    Ok(cfg)
}

/// Constructs the **embedding** profile.
///
/// # Env
/// - `OPENAI_API_KEY`, `OPENAI_EMBEDDING_MODEL` (required)
/// - `LLM_TIMEOUT_SECS` (optional)
///
/// # Defaults
/// - `timeout_secs = Some(30)`; sampling knobs are unused for embeddings.
pub fn config_openai_embedding() -> Result<LlmModelConfig, LlmError> {
    let cfg = LlmModelConfig {
        model: must_env("OPENAI_EMBEDDING_MODEL")?,
        endpoint: openai_endpoint(),
        api_key: must_env("OPENAI_API_KEY")?,
        max_tokens: None,
        temperature: None,
        timeout_secs: Some(env_opt_u64("LLM_TIMEOUT_SECS")?.unwrap_or(30)),
    };
    cfg.validate()?;
    Ok(cfg)
}
