//! End-to-end ingestion pipeline: read dataset → validate → embed → upsert.
//!
//! The dataset is a JSON array of Q&A records. Each record gets a
//! deterministic UUIDv5 id, so re-running ingestion on an unchanged dataset
//! upserts in place instead of duplicating. Records are processed in
//! fixed-size chunks; a failing chunk marks its records failed and does not
//! abort the remaining chunks.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::time::Instant;

use chrono::{DateTime, Utc};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::StoreConfig;
use crate::embed::{Embedder, embed_batch};
use crate::errors::StoreError;
use crate::ids::stable_point_id;
use crate::record::QaRecord;
use crate::store::VectorStore;

/// Final state of a single record after an ingestion run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    /// Stored under a previously unseen id.
    Inserted,
    /// Overwrote an item that already existed under the same id.
    Updated,
    /// Failed validation; nothing was stored.
    Skipped,
    /// Embedding or upsert failed for this record's chunk.
    Failed,
}

/// Per-record outcome, kept in the report for skipped/failed items.
#[derive(Clone, Debug, Serialize)]
pub struct ItemOutcome {
    /// Assigned deterministic id (absent for skipped records).
    pub id: Option<String>,
    /// Category label of the record, for attribution in logs.
    pub keyword: String,
    pub status: ItemStatus,
    /// Failure/skip reason, when there is one.
    pub reason: Option<String>,
}

/// Summary of a full ingestion run.
#[derive(Clone, Debug, Serialize)]
pub struct IngestionReport {
    pub total: usize,
    pub inserted: usize,
    pub updated: usize,
    pub skipped: usize,
    pub failed: usize,
    /// Outcomes for skipped and failed records only.
    pub failures: Vec<ItemOutcome>,
    /// Wall-clock start of the run.
    pub started_at: DateTime<Utc>,
    pub duration_ms: u128,
}

impl IngestionReport {
    fn new() -> Self {
        Self {
            total: 0,
            inserted: 0,
            updated: 0,
            skipped: 0,
            failed: 0,
            failures: Vec::new(),
            started_at: Utc::now(),
            duration_ms: 0,
        }
    }

    fn record(&mut self, outcome: ItemOutcome) {
        self.total += 1;
        match outcome.status {
            ItemStatus::Inserted => self.inserted += 1,
            ItemStatus::Updated => self.updated += 1,
            ItemStatus::Skipped => {
                self.skipped += 1;
                self.failures.push(outcome);
                return;
            }
            ItemStatus::Failed => {
                self.failed += 1;
                self.failures.push(outcome);
                return;
            }
        }
    }
}

/// Ingests a batch of raw records.
///
/// Invalid records are skipped (recorded in the report), valid ones are
/// embedded and upserted in chunks of `cfg.upsert_batch`. Only
/// infrastructure-level problems that make the whole run meaningless (e.g.
/// the id-existence lookup failing) escape as `Err`; per-record and
/// per-chunk failures land in the report.
pub async fn ingest(
    store: &dyn VectorStore,
    embedder: &dyn Embedder,
    cfg: &StoreConfig,
    records: Vec<QaRecord>,
) -> Result<IngestionReport, StoreError> {
    let started = Instant::now();
    info!("Ingesting {} records", records.len());

    let mut report = IngestionReport::new();
    let (valid, rejected) = partition_valid(records);
    for outcome in rejected {
        report.record(outcome);
    }

    // One existence lookup up front so inserts and updates can be told apart.
    let ids: Vec<Uuid> = valid.iter().map(|(id, _)| *id).collect();
    let mut existing = store.existing_ids(&ids).await?;

    let batch_size = cfg.upsert_batch.max(1);
    let total_chunks = valid.len().div_ceil(batch_size);
    let pb = ProgressBar::new(total_chunks as u64);
    pb.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} ({eta})",
        )
        .unwrap()
        .progress_chars("##-"),
    );

    for chunk in valid.chunks(batch_size) {
        let texts: Vec<String> = chunk
            .iter()
            .map(|(_, r)| r.embedding_text(cfg.embed_with_answer))
            .collect();

        let vectors = match embed_batch(&texts, embedder, cfg.embed_concurrency).await {
            Ok(v) => v,
            Err(e) => {
                warn!("Chunk embedding failed: {e}; continuing with next chunk");
                for (id, r) in chunk {
                    report.record(ItemOutcome {
                        id: Some(id.to_string()),
                        keyword: r.keyword.clone(),
                        status: ItemStatus::Failed,
                        reason: Some(format!("embedding failed: {e}")),
                    });
                }
                pb.inc(1);
                continue;
            }
        };

        let points: Vec<(Uuid, Vec<f32>, QaRecord)> = chunk
            .iter()
            .cloned()
            .zip(vectors)
            .map(|((id, r), v)| (id, v, r))
            .collect();

        match store.upsert_points(points).await {
            Ok(_) => {
                for (id, r) in chunk {
                    let key = id.to_string();
                    let status = if existing.contains(&key) {
                        ItemStatus::Updated
                    } else {
                        ItemStatus::Inserted
                    };
                    // A duplicate later in the same run is an update too.
                    existing.insert(key.clone());
                    report.record(ItemOutcome {
                        id: Some(key),
                        keyword: r.keyword.clone(),
                        status,
                        reason: None,
                    });
                }
            }
            Err(e) => {
                warn!("Chunk upsert failed: {e}; continuing with next chunk");
                for (id, r) in chunk {
                    report.record(ItemOutcome {
                        id: Some(id.to_string()),
                        keyword: r.keyword.clone(),
                        status: ItemStatus::Failed,
                        reason: Some(format!("upsert failed: {e}")),
                    });
                }
            }
        }
        pb.inc(1);
    }

    pb.finish_with_message("Ingestion complete");
    report.duration_ms = started.elapsed().as_millis();
    info!(
        total = report.total,
        inserted = report.inserted,
        updated = report.updated,
        skipped = report.skipped,
        failed = report.failed,
        duration_ms = report.duration_ms,
        "Ingestion finished"
    );
    Ok(report)
}

/// Ingests a JSON dataset file (an array of `{keyword, pregunta, respuesta}`).
pub async fn ingest_file(
    store: &dyn VectorStore,
    embedder: &dyn Embedder,
    cfg: &StoreConfig,
    path: impl AsRef<Path>,
) -> Result<IngestionReport, StoreError> {
    info!("Ingesting dataset file {:?}", path.as_ref());
    let file = File::open(path.as_ref())?;
    let records = parse_dataset(BufReader::new(file))?;
    ingest(store, embedder, cfg, records).await
}

/// Single-record ingestion, used by the add-item operation.
///
/// Unlike batch ingestion, validation failures are hard errors here:
/// nothing is stored and the caller gets [`StoreError::Validation`].
/// On success the assigned id is always known, so it is returned directly.
pub async fn add_item(
    store: &dyn VectorStore,
    embedder: &dyn Embedder,
    cfg: &StoreConfig,
    record: QaRecord,
) -> Result<(Uuid, ItemStatus), StoreError> {
    record.validate()?;

    let id = stable_point_id(&record.keyword, &record.pregunta);
    let existing = store.existing_ids(&[id]).await?;
    let status = if existing.contains(&id.to_string()) {
        ItemStatus::Updated
    } else {
        ItemStatus::Inserted
    };

    let vector = embedder
        .embed(&record.embedding_text(cfg.embed_with_answer))
        .await?;
    store
        .upsert_points(vec![(id, vector, record)])
        .await?;

    info!(id = %id, ?status, "Q&A item stored");
    Ok((id, status))
}

/// Parses a dataset reader holding a JSON array of records.
pub fn parse_dataset(reader: impl Read) -> Result<Vec<QaRecord>, StoreError> {
    let records: Vec<QaRecord> = serde_json::from_reader(reader)?;
    info!("Dataset parsed: {} records", records.len());
    Ok(records)
}

/// Splits records into `(id, record)` pairs for the valid ones and skip
/// outcomes for the rest.
fn partition_valid(records: Vec<QaRecord>) -> (Vec<(Uuid, QaRecord)>, Vec<ItemOutcome>) {
    let mut valid = Vec::with_capacity(records.len());
    let mut rejected = Vec::new();

    for r in records {
        match r.validate() {
            Ok(()) => {
                let id = stable_point_id(&r.keyword, &r.pregunta);
                valid.push((id, r));
            }
            Err(e) => {
                warn!(keyword = %r.keyword, "Record skipped: {e}");
                rejected.push(ItemOutcome {
                    id: None,
                    keyword: r.keyword,
                    status: ItemStatus::Skipped,
                    reason: Some(e.to_string()),
                });
            }
        }
    }

    (valid, rejected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DistanceKind;
    use crate::embed::test_support::StubEmbedder;
    use crate::store::test_support::MemStore;

    fn rec(keyword: &str, pregunta: &str, respuesta: &str) -> QaRecord {
        QaRecord {
            keyword: keyword.into(),
            pregunta: pregunta.into(),
            respuesta: respuesta.into(),
        }
    }

    fn cfg() -> StoreConfig {
        StoreConfig {
            qdrant_url: "http://localhost:6334".into(),
            qdrant_api_key: None,
            collection: "qa_items".into(),
            distance: DistanceKind::Cosine,
            vector_dim: 4,
            upsert_batch: 2,
            embed_concurrency: 2,
            embed_with_answer: false,
        }
    }

    #[tokio::test]
    async fn reingesting_the_same_dataset_is_idempotent() {
        let store = MemStore::new();
        let embedder = StubEmbedder { dim: 4, fail: false };
        let records = vec![
            rec("planes", "¿Qué incluye el Pack Completo?", "Todo lo premium."),
            rec("precios", "¿Hay descuentos anuales?", "Sí, un 20%."),
        ];

        let first = ingest(&store, &embedder, &cfg(), records.clone())
            .await
            .unwrap();
        assert_eq!(first.inserted, 2);
        assert_eq!(first.updated, 0);
        assert_eq!(store.len(), 2);

        let second = ingest(&store, &embedder, &cfg(), records).await.unwrap();
        assert_eq!(second.inserted, 0);
        assert_eq!(second.updated, 2);
        // Deterministic ids keep the stored count stable across runs.
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn add_item_returns_id_and_reports_insert_then_update() {
        let store = MemStore::new();
        let embedder = StubEmbedder { dim: 4, fail: false };
        let record = rec("planes", "¿Qué incluye el Pack Básico?", "Lo esencial.");

        let (first_id, first_status) = add_item(&store, &embedder, &cfg(), record.clone())
            .await
            .unwrap();
        assert_eq!(first_status, ItemStatus::Inserted);

        let (second_id, second_status) = add_item(&store, &embedder, &cfg(), record)
            .await
            .unwrap();
        assert_eq!(second_status, ItemStatus::Updated);
        assert_eq!(first_id, second_id);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn invalid_record_stores_nothing_in_add_item() {
        let store = MemStore::new();
        let embedder = StubEmbedder { dim: 4, fail: false };
        let err = add_item(&store, &embedder, &cfg(), rec("planes", " ", "r"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
        assert_eq!(store.len(), 0);
    }

    #[tokio::test]
    async fn unreachable_store_aborts_the_run() {
        let mut store = MemStore::new();
        store.fail = true;
        let embedder = StubEmbedder { dim: 4, fail: false };
        let err = ingest(&store, &embedder, &cfg(), vec![rec("planes", "p", "r")])
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Qdrant(_)));
    }

    #[test]
    fn partition_skips_invalid_records() {
        let records = vec![
            rec("planes", "¿Qué incluye el Pack Básico?", "Funciones esenciales."),
            rec("planes", "", "Sin pregunta."),
            rec("", "¿Hay descuentos?", "Sí."),
        ];
        let (valid, rejected) = partition_valid(records);
        assert_eq!(valid.len(), 1);
        assert_eq!(rejected.len(), 2);
        assert!(rejected.iter().all(|o| o.status == ItemStatus::Skipped));
        assert!(rejected.iter().all(|o| o.reason.is_some()));
    }

    #[test]
    fn partition_assigns_identical_ids_to_identical_content() {
        let a = rec("planes", "¿Qué incluye el Pack Básico?", "v1");
        let b = rec("planes", "¿Qué incluye el Pack Básico?", "v2 actualizada");
        let (valid, _) = partition_valid(vec![a, b]);
        assert_eq!(valid.len(), 2);
        // Same keyword+pregunta: same id, so the second upsert overwrites.
        assert_eq!(valid[0].0, valid[1].0);
    }

    #[test]
    fn report_counts_by_status() {
        let mut report = IngestionReport::new();
        for status in [
            ItemStatus::Inserted,
            ItemStatus::Inserted,
            ItemStatus::Updated,
            ItemStatus::Skipped,
            ItemStatus::Failed,
        ] {
            report.record(ItemOutcome {
                id: None,
                keyword: "k".into(),
                status,
                reason: Some("r".into()),
            });
        }
        assert_eq!(report.total, 5);
        assert_eq!(report.inserted, 2);
        assert_eq!(report.updated, 1);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.failed, 1);
        // Only skipped/failed keep their outcome entries.
        assert_eq!(report.failures.len(), 2);
    }

    #[test]
    fn dataset_parses_json_array() {
        let json = r#"[
            {"keyword":"planes","pregunta":"¿Qué diferencia hay entre el Pack Completo y el Básico?","respuesta":"El Completo incluye todas las funcionalidades premium."},
            {"keyword":"precios","pregunta":"¿Hay descuentos anuales?","respuesta":"Sí, un 20% pagando el año por adelantado."}
        ]"#;
        let records = parse_dataset(json.as_bytes()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].keyword, "precios");
    }

    #[test]
    fn malformed_dataset_is_a_parse_error() {
        let err = parse_dataset("{not json".as_bytes()).unwrap_err();
        assert!(matches!(err, StoreError::Parse(_)));
    }
}
