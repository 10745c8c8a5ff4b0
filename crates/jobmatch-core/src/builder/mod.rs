//! Index Builder
//!
//! Batch path from raw postings to a published index:
//! validate → embed (bounded rayon pool) → persist → publish.
//!
//! A posting that fails validation or embedding is skipped and reported;
//! it never aborts the batch and never enters the index without a vector.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use chrono::Utc;
use rayon::prelude::*;
use serde::Serialize;
use uuid::Uuid;

use crate::config::BuilderConfig;
use crate::embeddings::{EmbeddingProvider, BATCH_SIZE};
use crate::error::MatchError;
use crate::model::JobPosting;
use crate::search::JobIndex;
use crate::storage::{BuildKind, BuildRun, IndexMetadata, JobStore, StoredJob};

/// One skipped posting
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildFailure {
    pub id: String,
    pub reason: String,
}

/// Outcome of a rebuild or incremental add
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuildReport {
    pub run_id: Uuid,
    pub kind: BuildKind,
    pub submitted: usize,
    pub indexed: usize,
    pub failed: usize,
    pub failures: Vec<BuildFailure>,
    pub duration_ms: u64,
}

/// Embeds postings and writes them to the store and the index
///
/// Every write holds `writer` from the store write until the index is
/// published, so the store and the index always hold the same ids.
pub struct IndexBuilder {
    provider: Arc<dyn EmbeddingProvider>,
    index: Arc<JobIndex>,
    store: Arc<JobStore>,
    pool: rayon::ThreadPool,
    writer: Mutex<()>,
}

impl IndexBuilder {
    pub fn new(
        provider: Arc<dyn EmbeddingProvider>,
        index: Arc<JobIndex>,
        store: Arc<JobStore>,
        config: BuilderConfig,
    ) -> Result<Self, MatchError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.workers.max(1))
            .thread_name(|i| format!("jobmatch-embed-{}", i))
            .build()
            .map_err(|e| MatchError::WorkerPool(e.to_string()))?;
        Ok(Self {
            provider,
            index,
            store,
            pool,
            writer: Mutex::new(()),
        })
    }

    fn write_lock(&self) -> MutexGuard<'_, ()> {
        self.writer.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn metadata(&self) -> IndexMetadata {
        IndexMetadata {
            model: self.provider.model_name().to_string(),
            dimensions: self.provider.dimensions(),
        }
    }

    /// Replace the whole catalogue
    ///
    /// The store is rewritten first, then the index is swapped to the new
    /// content (and to the provider's dimension) in one publish.
    pub fn rebuild(&self, postings: Vec<JobPosting>) -> Result<BuildReport, MatchError> {
        let start = Instant::now();
        let started_at = Utc::now();
        let submitted = postings.len();
        let metadata = self.metadata();

        tracing::info!(submitted, model = %metadata.model, "Starting index rebuild");

        let (jobs, failures) = self.stage(postings);
        let indexed = {
            let _guard = self.write_lock();
            self.store.replace_all(&jobs, &metadata)?;
            self.index.rebuild_with_dimensions(
                metadata.dimensions,
                jobs.into_iter()
                    .map(|job| (job.posting.id.clone(), job.vector, job.posting)),
            )?
        };

        Ok(self.finish(BuildKind::Rebuild, started_at, start, submitted, indexed, failures))
    }

    /// Insert or replace postings without touching the rest of the catalogue
    ///
    /// Fails with `DimensionMismatch` when the provider no longer matches the
    /// index; a full rebuild is then required.
    pub fn add(&self, postings: Vec<JobPosting>) -> Result<BuildReport, MatchError> {
        let start = Instant::now();
        let started_at = Utc::now();
        let submitted = postings.len();
        let metadata = self.metadata();

        self.check_dimensions(metadata.dimensions)?;

        tracing::info!(submitted, "Starting incremental index add");

        let (jobs, failures) = self.stage(postings);
        let indexed = if jobs.is_empty() {
            0
        } else {
            let _guard = self.write_lock();
            // A rebuild may have changed the dimension while we were embedding
            self.check_dimensions(metadata.dimensions)?;
            self.store.upsert(&jobs, &metadata)?;
            self.index.insert_batch(
                jobs.into_iter()
                    .map(|job| (job.posting.id.clone(), job.vector, job.posting)),
            )?
        };

        Ok(self.finish(BuildKind::Incremental, started_at, start, submitted, indexed, failures))
    }

    /// Delete one posting from store and index; false when neither held it
    pub fn remove(&self, id: &str) -> Result<bool, MatchError> {
        let _guard = self.write_lock();
        let stored = self.store.remove(id)?;
        let indexed = self.index.remove(id);
        Ok(stored || indexed)
    }

    fn check_dimensions(&self, provided: usize) -> Result<(), MatchError> {
        let indexed = self.index.dimensions();
        if provided != indexed {
            return Err(MatchError::DimensionMismatch {
                expected: indexed,
                actual: provided,
            });
        }
        Ok(())
    }

    /// Validate, de-duplicate and embed; output keeps input order
    fn stage(&self, postings: Vec<JobPosting>) -> (Vec<StoredJob>, Vec<BuildFailure>) {
        let mut failures = Vec::new();
        let mut seen = HashSet::new();
        let mut valid = Vec::with_capacity(postings.len());

        for posting in postings {
            if let Err(e) = posting.validate() {
                failures.push(BuildFailure {
                    id: posting.id.clone(),
                    reason: e.to_string(),
                });
                continue;
            }
            if !seen.insert(posting.id.clone()) {
                failures.push(BuildFailure {
                    id: posting.id.clone(),
                    reason: "duplicate id in batch".to_string(),
                });
                continue;
            }
            valid.push(posting);
        }

        let provider = &self.provider;
        let embeddings: Vec<_> = self.pool.install(|| {
            valid
                .par_chunks(BATCH_SIZE)
                .map(|chunk| {
                    let texts: Vec<String> = chunk.iter().map(JobPosting::embedding_text).collect();
                    let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
                    provider.embed_batch(&refs)
                })
                .collect::<Vec<_>>()
        });

        let dimensions = provider.dimensions();
        let mut jobs = Vec::with_capacity(valid.len());
        for (posting, embedding) in valid.into_iter().zip(embeddings.into_iter().flatten()) {
            let outcome = embedding
                .map_err(|e| e.to_string())
                .and_then(|embedding| usable_vector(embedding.vector, dimensions));
            match outcome {
                Ok(vector) => jobs.push(StoredJob {
                    posting: Arc::new(posting),
                    vector,
                }),
                Err(reason) => {
                    tracing::warn!(id = %posting.id, %reason, "Skipping posting");
                    failures.push(BuildFailure { id: posting.id, reason });
                }
            }
        }

        (jobs, failures)
    }

    fn finish(
        &self,
        kind: BuildKind,
        started_at: chrono::DateTime<Utc>,
        start: Instant,
        submitted: usize,
        indexed: usize,
        failures: Vec<BuildFailure>,
    ) -> BuildReport {
        let report = BuildReport {
            run_id: Uuid::new_v4(),
            kind,
            submitted,
            indexed,
            failed: failures.len(),
            failures,
            duration_ms: start.elapsed().as_millis() as u64,
        };

        let run = BuildRun {
            id: report.run_id,
            kind,
            started_at,
            duration_ms: report.duration_ms,
            submitted,
            indexed,
            failed: report.failed,
            model: self.provider.model_name().to_string(),
        };
        if let Err(e) = self.store.record_build_run(&run) {
            tracing::warn!(error = %e, "Failed to record build run");
        }

        tracing::info!(
            kind = kind.as_str(),
            indexed,
            failed = report.failed,
            duration_ms = report.duration_ms,
            "Index build finished"
        );
        report
    }
}

/// Correct length, finite and non-zero
fn usable_vector(vector: Vec<f32>, dimensions: usize) -> Result<Vec<f32>, String> {
    if vector.len() != dimensions {
        return Err(format!(
            "embedding has dimension {}, expected {}",
            vector.len(),
            dimensions
        ));
    }
    if !vector.iter().all(|x| x.is_finite()) {
        return Err("embedding contains non-finite values".to_string());
    }
    if vector.iter().all(|x| *x == 0.0) {
        return Err("embedding is the zero vector".to_string());
    }
    Ok(vector)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IndexConfig;
    use crate::embeddings::{Embedding, EmbeddingError, HashEmbedder};
    use crate::model::{Industry, JobLevel, Region};
    use tempfile::TempDir;

    /// Hashing embedder that refuses any text containing "FAIL"
    struct PickyEmbedder(HashEmbedder);

    impl EmbeddingProvider for PickyEmbedder {
        fn model_name(&self) -> &str {
            "picky"
        }

        fn dimensions(&self) -> usize {
            self.0.dimensions()
        }

        fn embed(&self, text: &str) -> Result<Embedding, EmbeddingError> {
            if text.contains("FAIL") {
                return Err(EmbeddingError::Backend("refused".to_string()));
            }
            self.0.embed(text)
        }
    }

    struct Fixture {
        builder: IndexBuilder,
        index: Arc<JobIndex>,
        store: Arc<JobStore>,
        _dir: TempDir,
    }

    fn fixture(provider: Arc<dyn EmbeddingProvider>, index_dimensions: usize) -> Fixture {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(JobStore::open(Some(dir.path().to_path_buf())).unwrap());
        let index = Arc::new(JobIndex::new(index_dimensions, IndexConfig::exact()));
        let builder = IndexBuilder::new(provider, index.clone(), store.clone(), BuilderConfig { workers: 2 }).unwrap();
        Fixture {
            builder,
            index,
            store,
            _dir: dir,
        }
    }

    fn posting(id: &str, title: &str) -> JobPosting {
        JobPosting::new(id, title, Region::Mena, Industry::Technology, JobLevel::Mid)
            .with_required_skills(["Python"])
    }

    #[test]
    fn test_rebuild_indexes_and_persists() {
        let f = fixture(Arc::new(HashEmbedder::new(64)), 64);
        let report = f
            .builder
            .rebuild((0..40).map(|i| posting(&format!("J{:02}", i), "Engineer")).collect())
            .unwrap();

        assert_eq!(report.indexed, 40);
        assert_eq!(report.failed, 0);
        assert_eq!(f.index.len(), 40);
        assert_eq!(f.store.count().unwrap(), 40);
        assert_eq!(f.store.recent_build_runs(1).unwrap()[0].id, report.run_id);
    }

    #[test]
    fn test_embedding_failure_skips_posting() {
        let f = fixture(Arc::new(PickyEmbedder(HashEmbedder::new(32))), 32);
        let report = f
            .builder
            .rebuild(vec![posting("A", "Engineer"), posting("B", "FAIL"), posting("C", "Analyst")])
            .unwrap();

        assert_eq!(report.indexed, 2);
        assert_eq!(report.failures, vec![BuildFailure {
            id: "B".to_string(),
            reason: "Embedding generation failed: refused".to_string(),
        }]);
        assert!(!f.index.contains("B"));
        assert_eq!(f.store.count().unwrap(), 2);
    }

    #[test]
    fn test_duplicate_and_invalid_postings() {
        let f = fixture(Arc::new(HashEmbedder::new(32)), 32);
        let report = f
            .builder
            .rebuild(vec![posting("A", "First"), posting("A", "Second"), posting("", "No id")])
            .unwrap();

        assert_eq!(report.indexed, 1);
        assert_eq!(report.failed, 2);
        assert_eq!(f.index.snapshot().get("A").unwrap().title, "First");
    }

    #[test]
    fn test_rebuild_replaces_catalogue() {
        let f = fixture(Arc::new(HashEmbedder::new(32)), 32);
        f.builder.rebuild(vec![posting("A", "Engineer")]).unwrap();
        f.builder.rebuild(vec![posting("B", "Engineer")]).unwrap();
        assert!(!f.index.contains("A"));
        assert!(f.index.contains("B"));
        assert_eq!(f.store.count().unwrap(), 1);
    }

    #[test]
    fn test_rebuild_adopts_provider_dimension() {
        let f = fixture(Arc::new(HashEmbedder::new(48)), 16);
        f.builder.rebuild(vec![posting("A", "Engineer")]).unwrap();
        assert_eq!(f.index.dimensions(), 48);
    }

    #[test]
    fn test_add_is_incremental() {
        let f = fixture(Arc::new(HashEmbedder::new(32)), 32);
        f.builder.rebuild(vec![posting("A", "Engineer")]).unwrap();
        let report = f.builder.add(vec![posting("B", "Analyst")]).unwrap();
        assert_eq!(report.kind, BuildKind::Incremental);
        assert_eq!(f.index.len(), 2);
        assert_eq!(f.store.count().unwrap(), 2);
    }

    #[test]
    fn test_add_rejects_dimension_change() {
        let f = fixture(Arc::new(HashEmbedder::new(32)), 16);
        assert!(matches!(
            f.builder.add(vec![posting("A", "Engineer")]),
            Err(MatchError::DimensionMismatch { expected: 16, actual: 32 })
        ));
        assert!(f.index.is_empty());
    }

    #[test]
    fn test_remove() {
        let f = fixture(Arc::new(HashEmbedder::new(32)), 32);
        f.builder.rebuild(vec![posting("A", "Engineer"), posting("B", "Analyst")]).unwrap();
        assert!(f.builder.remove("A").unwrap());
        assert!(!f.builder.remove("A").unwrap());
        assert!(!f.index.contains("A"));
        assert_eq!(f.store.count().unwrap(), 1);
    }

    #[test]
    fn test_concurrent_rebuild_and_add_keep_store_and_index_aligned() {
        let f = fixture(Arc::new(HashEmbedder::new(32)), 32);
        let big: Vec<JobPosting> = (0..1500).map(|i| posting(&format!("R{:04}", i), "Engineer")).collect();

        for round in 0..4 {
            std::thread::scope(|s| {
                s.spawn(|| f.builder.rebuild(big.clone()).unwrap());
                s.spawn(|| {
                    for i in 0..20 {
                        f.builder.add(vec![posting(&format!("ADD{}-{}", round, i), "Analyst")]).unwrap();
                    }
                });
            });

            let mut stored: Vec<String> = f.store.load_all().unwrap().into_iter().map(|j| j.posting.id.clone()).collect();
            stored.sort();
            let mut indexed: Vec<String> = f.index.snapshot().iter().map(|(id, _, _)| id.to_string()).collect();
            indexed.sort();
            assert_eq!(indexed, stored, "round {}", round);
        }
    }

    #[test]
    fn test_usable_vector() {
        assert!(usable_vector(vec![0.0, 1.0], 2).is_ok());
        assert!(usable_vector(vec![0.0, 0.0], 2).is_err());
        assert!(usable_vector(vec![f32::NAN, 1.0], 2).is_err());
        assert!(usable_vector(vec![1.0], 2).is_err());
    }
}
