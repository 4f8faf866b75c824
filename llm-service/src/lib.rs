//! Shared OpenAI service used by the Q&A pipeline.
//!
//! Public surface:
//! - [`config`] — strongly typed model configs loaded from environment.
//! - [`openai::OpenAiService`] — embeddings + JSON-mode chat completions.
//! - [`health::HealthService`] — resilient provider health probes.
//! - [`error_handler`] — unified error types for the crate.

pub mod config;
pub mod error_handler;
pub mod health;
pub mod openai;
