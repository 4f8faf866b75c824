//! Grounded question answering over the Q&A store.
//!
//! Public API:
//! - [`QaEngine`]: retrieve evidence, compose prompts, generate a JSON-mode
//!   answer and apply the confidence gate.
//! - [`engine::health`]: resilient probe of both collaborators.
//! - [`prompt`]: pure prompt composition (golden-testable).
//! - [`parse`]: model-output sanitation and strict parsing.

pub mod engine;
pub mod errors;
pub mod parse;
pub mod prompt;
pub mod types;

pub use engine::{Completions, OpenAiCompletions, QaEngine, health};
pub use errors::EngineError;
pub use types::{GeneratedAnswer, HealthReport, QueryOutcome, QueryRequest};
