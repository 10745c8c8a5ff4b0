//! Match engine
//!
//! Retrieval runs against a single snapshot, so a concurrent rebuild is
//! either fully visible to a request or not at all.

use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use lru::LruCache;

use super::filters::{validate_top_k, MatchFilters};
use crate::config::MatchConfig;
use crate::embeddings::EmbeddingProvider;
use crate::error::MatchError;
use crate::model::{CandidateProfile, JobPosting, MatchResult};
use crate::scoring::{PreparedCandidate, ScoreComposer};
use crate::search::{JobIndex, JobSnapshot, VectorIndexError};

/// A scored posting together with the posting itself
#[derive(Debug, Clone, PartialEq)]
pub struct RankedMatch {
    pub result: MatchResult,
    pub posting: Arc<JobPosting>,
}

/// Ranked matches plus the index version they were computed against
#[derive(Debug, Clone, PartialEq)]
pub struct MatchOutcome {
    pub matches: Vec<RankedMatch>,
    pub index_version: u64,
}

/// Embeds candidates, retrieves a superset, filters, scores and ranks
pub struct MatchEngine {
    provider: Arc<dyn EmbeddingProvider>,
    index: Arc<JobIndex>,
    composer: ScoreComposer,
    config: MatchConfig,
    query_cache: Option<Mutex<LruCache<String, Arc<[f32]>>>>,
}

impl MatchEngine {
    pub fn new(provider: Arc<dyn EmbeddingProvider>, index: Arc<JobIndex>, config: MatchConfig) -> Self {
        let query_cache = NonZeroUsize::new(config.query_cache_capacity).map(|cap| Mutex::new(LruCache::new(cap)));
        Self {
            provider,
            index,
            composer: ScoreComposer::default(),
            config,
            query_cache,
        }
    }

    pub fn with_composer(mut self, composer: ScoreComposer) -> Self {
        self.composer = composer;
        self
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    pub fn index(&self) -> &Arc<JobIndex> {
        &self.index
    }

    pub fn provider(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.provider
    }

    /// Top `top_k` postings for `candidate`, best first
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

    /// Same as [`MatchEngine::find_matches`], keeping each posting
    pub fn find_matches_detailed(
        &self,
        candidate: &CandidateProfile,
        filters: &MatchFilters,
        top_k: usize,
    ) -> Result<MatchOutcome, MatchError> {
        candidate.validate()?;
        let top_k = validate_top_k(top_k, self.config.max_top_k)?;
        self.check_dimensions()?;

        let start = Instant::now();
        let snapshot = self.index.snapshot();
        let index_version = snapshot.version();
        if snapshot.is_empty() {
            return Ok(MatchOutcome {
                matches: Vec::new(),
                index_version,
            });
        }

        let query = self.embed_candidate(candidate)?;
        if snapshot.dimensions() != query.len() {
            return Err(MatchError::DimensionMismatch {
                expected: snapshot.dimensions(),
                actual: query.len(),
            });
        }

        let prepared = PreparedCandidate::new(candidate);
        let matches = self.rank(&snapshot, &query, &prepared, filters, top_k)?;

        tracing::debug!(
            top_k,
            returned = matches.len(),
            index_version,
            elapsed_us = start.elapsed().as_micros() as u64,
            "Match request served"
        );

        Ok(MatchOutcome { matches, index_version })
    }

    /// Fetch `top_k × multiplier` neighbours, widening while filters leave
    /// too few survivors and the snapshot has more to give
    fn rank(
        &self,
        snapshot: &JobSnapshot,
        query: &[f32],
        candidate: &PreparedCandidate,
        filters: &MatchFilters,
        top_k: usize,
    ) -> Result<Vec<RankedMatch>, MatchError> {
        let available = snapshot.len();
        let mut fetch = top_k
            .saturating_mul(self.config.candidate_multiplier.max(1))
            .min(available);

        loop {
            let neighbors = match snapshot.search(query, fetch) {
                Ok(neighbors) => neighbors,
                Err(VectorIndexError::EmptyIndex) => return Ok(Vec::new()),
                Err(e) => return Err(e.into()),
            };

            let mut survivors: Vec<RankedMatch> = neighbors
                .into_iter()
                .filter(|n| filters.accepts(&n.payload))
                .map(|n| RankedMatch {
                    result: self
                        .composer
                        .compose_prepared(candidate, &n.payload, f64::from(n.similarity)),
                    posting: n.payload,
                })
                .filter(|m| self.config.min_score.is_none_or(|min| m.result.total_score >= min))
                .collect();

            if survivors.len() >= top_k || fetch >= available {
                sort_ranked(&mut survivors);
                survivors.truncate(top_k);
                return Ok(survivors);
            }

            tracing::trace!(fetch, survivors = survivors.len(), "Widening candidate fetch");
            fetch = fetch.saturating_mul(2).min(available);
        }
    }

    fn check_dimensions(&self) -> Result<(), MatchError> {
        let provided = self.provider.dimensions();
        let indexed = self.index.dimensions();
        if provided != indexed {
            return Err(MatchError::DimensionMismatch {
                expected: indexed,
                actual: provided,
            });
        }
        Ok(())
    }

    fn embed_candidate(&self, candidate: &CandidateProfile) -> Result<Arc<[f32]>, MatchError> {
        let text = candidate.embedding_text();

        if let Some(cache) = &self.query_cache {
            let mut cache = cache.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(cached) = cache.get(&text) {
                return Ok(Arc::clone(cached));
            }
        }

        let embedding = self.provider.embed(&text)?;
        let vector: Arc<[f32]> = embedding.vector.into();

        if let Some(cache) = &self.query_cache {
            let mut cache = cache.lock().unwrap_or_else(PoisonError::into_inner);
            cache.put(text, Arc::clone(&vector));
        }

        Ok(vector)
    }
}

/// Total score descending, then job id ascending
pub(crate) fn sort_ranked(matches: &mut [RankedMatch]) {
    matches.sort_by(|a, b| {
        b.result
            .total_score
            .total_cmp(&a.result.total_score)
            .then_with(|| a.result.job_id.cmp(&b.result.job_id))
    });
}

// ============================================================================
// TESTS
// ============================================================================
