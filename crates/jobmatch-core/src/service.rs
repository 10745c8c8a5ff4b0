//! Match Service
//!
//! Owns the provider, index, store, engine and builder, and tracks whether
//! the index can be trusted. A store that fails to load, or that holds
//! vectors of a different dimension than the provider produces, leaves the
//! service degraded: matches are refused until a rebuild succeeds.

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};

use serde::Serialize;

use crate::builder::{BuildReport, IndexBuilder};
use crate::config::Config;
use crate::embeddings::{build_provider, EmbeddingProvider};
use crate::error::MatchError;
use crate::matching::{
    recommend_skills, regional_insights, MatchEngine, MatchFilters, MatchOutcome, MatchRequest,
    RegionalInsights, SkillRecommendation,
};
use crate::model::{CandidateProfile, JobPosting, MatchResult, Region};
use crate::search::{IndexStats, JobIndex};
use crate::storage::{BuildRun, JobStore, StorageError};

/// Whether matches can be served
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Health {
    Ready,
    Degraded { reason: String },
}

impl Health {
    pub fn is_ready(&self) -> bool {
        matches!(self, Health::Ready)
    }
}

/// Index statistics plus the model and health of the service
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceStats {
    #[serde(flatten)]
    pub index: IndexStats,
    pub model: String,
    pub health: Health,
}

pub struct MatchService {
    config: Config,
    provider: Arc<dyn EmbeddingProvider>,
    index: Arc<JobIndex>,
    store: Arc<JobStore>,
    engine: MatchEngine,
    builder: IndexBuilder,
    degraded: RwLock<Option<String>>,
}

impl MatchService {
    /// Open the store and provider named by `config`
    pub fn open(config: Config) -> Result<Self, MatchError> {
        config.validate()?;
        let provider = build_provider(&config.embedding)?;
        Self::open_with_provider(config, provider)
    }

    /// Open with an explicitly constructed provider
    pub fn open_with_provider(config: Config, provider: Arc<dyn EmbeddingProvider>) -> Result<Self, MatchError> {
        let store = Arc::new(JobStore::open(config.data_dir.clone())?);
        let index = Arc::new(JobIndex::new(provider.dimensions(), config.index));

        let degraded = Self::load(&store, &index, provider.as_ref())?;
        if let Some(reason) = &degraded {
            tracing::error!(%reason, "Index degraded; rebuild required");
        }

        let engine = MatchEngine::new(provider.clone(), index.clone(), config.matching);
        let builder = IndexBuilder::new(provider.clone(), index.clone(), store.clone(), config.builder)?;

        tracing::info!(
            path = %store.path().display(),
            model = provider.model_name(),
            dimensions = provider.dimensions(),
            entries = index.len(),
            "Match service ready"
        );

        Ok(Self {
            config,
            provider,
            index,
            store,
            engine,
            builder,
            degraded: RwLock::new(degraded),
        })
    }

    /// Load persisted postings into the index
    ///
    /// Returns the degradation reason, if any. Only unexpected database
    /// failures are errors.
    fn load(
        store: &JobStore,
        index: &JobIndex,
        provider: &dyn EmbeddingProvider,
    ) -> Result<Option<String>, MatchError> {
        let metadata = match store.metadata() {
            Ok(metadata) => metadata,
            Err(StorageError::Corrupt(reason)) => return Ok(Some(reason)),
            Err(e) => return Err(e.into()),
        };

        if let Some(meta) = &metadata {
            if meta.dimensions != provider.dimensions() {
                return Ok(Some(format!(
                    "stored embeddings have dimension {} ({}), provider {} produces {}",
                    meta.dimensions,
                    meta.model,
                    provider.model_name(),
                    provider.dimensions()
                )));
            }
            if meta.model != provider.model_name() {
                tracing::warn!(
                    stored = %meta.model,
                    configured = provider.model_name(),
                    "Stored embeddings come from a different model"
                );
            }
        }

        let jobs = match store.load_all() {
            Ok(jobs) => jobs,
            Err(StorageError::Corrupt(reason)) => return Ok(Some(reason)),
            Err(e) => return Err(e.into()),
        };

        match index.rebuild(
            jobs.into_iter()
                .map(|job| (job.posting.id.clone(), job.vector, job.posting)),
        ) {
            Ok(count) => {
                tracing::debug!(count, "Loaded postings from store");
                Ok(None)
            }
            Err(e) => Ok(Some(format!("stored embeddings rejected by index: {}", e))),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn provider(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.provider
    }

    pub fn index(&self) -> &Arc<JobIndex> {
        &self.index
    }

    pub fn store_path(&self) -> &Path {
        self.store.path()
    }

    pub fn health(&self) -> Health {
        match self.degraded.read().unwrap_or_else(PoisonError::into_inner).as_ref() {
            Some(reason) => Health::Degraded { reason: reason.clone() },
            None => Health::Ready,
        }
    }

    fn ensure_ready(&self) -> Result<(), MatchError> {
        match self.health() {
            Health::Ready => Ok(()),
            Health::Degraded { reason } => Err(MatchError::Degraded(reason)),
        }
    }

    fn set_degraded(&self, reason: Option<String>) {
        *self.degraded.write().unwrap_or_else(PoisonError::into_inner) = reason;
    }

    /// Validate a wire request and run it
    pub fn match_request(&self, request: &MatchRequest) -> Result<MatchOutcome, MatchError> {
        let filters = request.filters.parse()?;
        let top_k = request.top_k.unwrap_or(self.config.matching.default_top_k);
        self.find_matches_detailed(&request.candidate, &filters, top_k)
    }

    pub fn find_matches(
        &self,
        candidate: &CandidateProfile,
        filters: &MatchFilters,
        top_k: usize,
    ) -> Result<Vec<MatchResult>, MatchError> {
        Ok(self
            .find_matches_detailed(candidate, filters, top_k)?
            .matches
            .into_iter()
            .map(|m| m.result)
            .collect())
    }

    pub fn find_matches_detailed(
        &self,
        candidate: &CandidateProfile,
        filters: &MatchFilters,
        top_k: usize,
    ) -> Result<MatchOutcome, MatchError> {
        self.ensure_ready()?;
        let outcome = self.engine.find_matches_detailed(candidate, filters, top_k);
        if let Err(MatchError::DimensionMismatch { expected, actual }) = &outcome {
            self.set_degraded(Some(format!(
                "index holds dimension {}, provider produces {}",
                expected, actual
            )));
        }
        outcome
    }

    /// Replace the catalogue; a successful rebuild clears degradation
    pub fn rebuild(&self, postings: Vec<JobPosting>) -> Result<BuildReport, MatchError> {
        let report = self.builder.rebuild(postings)?;
        if !self.health().is_ready() {
            tracing::info!("Rebuild succeeded; service ready");
        }
        self.set_degraded(None);
        Ok(report)
    }

    pub fn add(&self, postings: Vec<JobPosting>) -> Result<BuildReport, MatchError> {
        self.ensure_ready()?;
        self.builder.add(postings)
    }

    /// Delete a posting from store and index; false when it did not exist
    pub fn remove(&self, id: &str) -> Result<bool, MatchError> {
        let removed = self.builder.remove(id)?;
        if removed {
            tracing::info!(id, "Posting removed");
        }
        Ok(removed)
    }

    pub fn posting(&self, id: &str) -> Option<Arc<JobPosting>> {
        self.index.snapshot().get(id).cloned()
    }

    /// Read a posting back from the store; available while degraded
    pub fn stored_posting(&self, id: &str) -> Result<JobPosting, MatchError> {
        match self.store.get(id) {
            Ok(posting) => Ok(posting),
            Err(StorageError::NotFound(id)) => Err(MatchError::NotFound(format!("posting {}", id))),
            Err(e) => Err(e.into()),
        }
    }

    pub fn stats(&self) -> ServiceStats {
        ServiceStats {
            index: self.index.stats(),
            model: self.provider.model_name().to_string(),
            health: self.health(),
        }
    }

    pub fn regional_insights(&self, region: Region) -> RegionalInsights {
        regional_insights(&self.index.snapshot(), region)
    }

    pub fn recommend_skills(&self, skills: &BTreeSet<String>, region: Option<Region>) -> Vec<SkillRecommendation> {
        recommend_skills(&self.index.snapshot(), skills, region)
    }

    pub fn build_runs(&self, limit: usize) -> Result<Vec<BuildRun>, MatchError> {
        Ok(self.store.recent_build_runs(limit)?)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EmbeddingConfig;
    use crate::embeddings::HashEmbedder;
    use crate::sample::sample_postings;
    use tempfile::TempDir;

    fn config(dir: &TempDir, dimensions: usize) -> Config {
        Config {
            data_dir: Some(dir.path().to_path_buf()),
            embedding: EmbeddingConfig::hashing(dimensions),
            ..Config::default()
        }
    }

    #[test]
    fn test_open_empty_is_ready() {
        let dir = TempDir::new().unwrap();
        let service = MatchService::open(config(&dir, 64)).unwrap();
        assert_eq!(service.health(), Health::Ready);
        assert_eq!(service.stats().index.entries, 0);
    }

    #[test]
    fn test_seed_and_match() {
        let dir = TempDir::new().unwrap();
        let service = MatchService::open(config(&dir, 128)).unwrap();
        let report = service.rebuild(sample_postings()).unwrap();
        assert_eq!(report.indexed, 10);

        let candidate = CandidateProfile::new(["Python", "Django", "AWS"], 6.0).unwrap();
        let filters = MatchFilters::new().region(Region::Mena);
        let matches = service.find_matches(&candidate, &filters, 3).unwrap();
        assert!(!matches.is_empty());
        assert!(matches.windows(2).all(|w| w[0].total_score >= w[1].total_score));
        for m in &matches {
            assert_eq!(service.posting(&m.job_id).unwrap().region, Region::Mena);
        }
    }

    #[test]
    fn test_reopen_restores_catalogue() {
        let dir = TempDir::new().unwrap();
        let candidate = CandidateProfile::new(["Java", "Spring Boot"], 5.0).unwrap();
        let before = {
            let service = MatchService::open(config(&dir, 64)).unwrap();
            service.rebuild(sample_postings()).unwrap();
            service.find_matches(&candidate, &MatchFilters::new(), 5).unwrap()
        };
        let service = MatchService::open(config(&dir, 64)).unwrap();
        assert_eq!(service.index().len(), 10);
        assert_eq!(service.find_matches(&candidate, &MatchFilters::new(), 5).unwrap(), before);
    }

    #[test]
    fn test_dimension_change_degrades_until_rebuild() {
        let dir = TempDir::new().unwrap();
        {
            let service = MatchService::open(config(&dir, 64)).unwrap();
            service.rebuild(sample_postings()).unwrap();
        }

        let service =
            MatchService::open_with_provider(config(&dir, 32), Arc::new(HashEmbedder::new(32))).unwrap();
        assert!(!service.health().is_ready());
        let candidate = CandidateProfile::new(["Python"], 3.0).unwrap();
        assert!(matches!(
            service.find_matches(&candidate, &MatchFilters::new(), 5),
            Err(MatchError::Degraded(_))
        ));
        assert!(matches!(
            service.add(sample_postings()),
            Err(MatchError::Degraded(_))
        ));

        service.rebuild(sample_postings()).unwrap();
        assert!(service.health().is_ready());
        assert!(!service.find_matches(&candidate, &MatchFilters::new(), 5).unwrap().is_empty());
    }

    #[test]
    fn test_remove() {
        let dir = TempDir::new().unwrap();
        let service = MatchService::open(config(&dir, 64)).unwrap();
        service.rebuild(sample_postings()).unwrap();
        assert!(service.remove("JOB001").unwrap());
        assert!(!service.remove("JOB001").unwrap());
        assert!(service.posting("JOB001").is_none());
        assert!(matches!(service.stored_posting("JOB001"), Err(MatchError::NotFound(_))));
        assert_eq!(service.stored_posting("JOB002").unwrap().id, "JOB002");
    }

    #[test]
    fn test_match_request_rejects_unknown_region() {
        let dir = TempDir::new().unwrap();
        let service = MatchService::open(config(&dir, 64)).unwrap();
        let request: MatchRequest = serde_json::from_str(
            r#"{"candidate": {"technical_skills": ["Go"]}, "filters": {"regions": ["Atlantis"]}}"#,
        )
        .unwrap();
        assert!(matches!(service.match_request(&request), Err(MatchError::Validation(_))));
    }
}
