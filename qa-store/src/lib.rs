//! Vector-store layer for the Q&A corpus.
//!
//! Public API:
//! - [`QdrantFacade`]: connection, collection provisioning, upsert, k-NN search.
//! - [`retrieve::search`]: embed a query, search, rank and threshold-filter.
//! - [`ingest`]: batch dataset ingestion with per-record outcomes, plus the
//!   single-record [`ingest::add_item`].
//! - [`embed::Embedder`]: the embedding-provider seam (OpenAI adapter included).
//! - [`store::VectorStore`]: the store seam implemented by the facade.

pub mod config;
pub mod embed;
pub mod errors;
pub mod ids;
pub mod ingest;
pub mod qdrant_facade;
pub mod record;
pub mod retrieve;
pub mod store;

pub use config::{DistanceKind, SearchConfig, StoreConfig};
pub use embed::Embedder;
pub use errors::StoreError;
pub use ids::stable_point_id;
pub use ingest::{IngestionReport, ItemOutcome, ItemStatus};
pub use qdrant_facade::QdrantFacade;
pub use record::{QaRecord, SearchResult};
pub use store::VectorStore;
