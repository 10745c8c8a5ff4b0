//! # JobMatch Core
//!
//! Semantic job-matching engine. Candidate profiles and job postings are
//! embedded into vectors, postings are indexed for nearest-neighbour search,
//! and every retrieved posting receives an explainable 0-100 score.
//!
//! - **Embedding Providers**: feature hashing, local fastembed models, or an
//!   OpenAI-compatible endpoint
//! - **Vector Index**: exact scan or USearch HNSW behind copy-on-write snapshots
//! - **Score Composer**: similarity blended with skill overlap, experience and level
//! - **Match Engine**: retrieve, filter by region/industry/level, score, rank
//! - **Index Builder**: batch embedding on a bounded worker pool
//! - **Job Store**: SQLite persistence of postings and embeddings
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use jobmatch_core::{CandidateProfile, Config, MatchFilters, MatchService, Region};
//!
//! let service = MatchService::open(Config::from_env()?)?;
//! service.rebuild(jobmatch_core::sample_postings())?;
//!
//! let candidate = CandidateProfile::new(["Python", "Django"], 4.0)?;
//! let filters = MatchFilters::new().region(Region::Mena);
//! for result in service.find_matches(&candidate, &filters, 5)? {
//!     println!("{} {:.0}", result.job_id, result.total_score);
//! }
//! ```
//!
//! ## Feature Flags
//!
//! - `embeddings` (default): local embedding generation with fastembed
//! - `vector-search` (default): HNSW approximate search with USearch
//! - `remote-embeddings` (default): OpenAI-compatible HTTP embedding backend
//! - `bundled-sqlite` (default): compile SQLite into the binary

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(rustdoc::missing_crate_level_docs)]

// ============================================================================
// MODULES
// ============================================================================

pub mod builder;
pub mod config;
pub mod embeddings;
pub mod error;
pub mod matching;
pub mod model;
pub mod sample;
pub mod scoring;
pub mod search;
pub mod service;
pub mod storage;

// ============================================================================
// PUBLIC API RE-EXPORTS
// ============================================================================

// Data model
pub use model::{
    normalize_skill, CandidateProfile, EducationLevel, Industry, JobLevel, JobPosting, MatchResult,
    Region, SalaryRange, ValidationError,
};

// Configuration
pub use config::{
    BuilderConfig, Config, ConfigError, EmbeddingBackend, EmbeddingConfig, HnswParams, IndexConfig,
    LocalModel, MatchConfig, RemoteConfig, SearchStrategy,
};

// Embeddings
pub use embeddings::{build_provider, Embedding, EmbeddingError, EmbeddingProvider, HashEmbedder};
#[cfg(feature = "embeddings")]
pub use embeddings::LocalEmbedder;
#[cfg(feature = "remote-embeddings")]
pub use embeddings::RemoteEmbedder;

// Vector index
pub use search::{IndexStats, JobIndex, JobSnapshot, Neighbor, Snapshot, VectorIndex, VectorIndexError};

// Scoring
pub use scoring::{ScoreComposer, ScoreWeights, DEFAULT_WEIGHTS};

// Matching
pub use matching::{
    MatchEngine, MatchFilters, MatchOutcome, MatchRequest, Priority, RankedMatch, RawFilters,
    RegionalInsights, SkillCount, SkillRecommendation,
};

// Building
pub use builder::{BuildFailure, BuildReport, IndexBuilder};

// Storage
pub use storage::{BuildKind, BuildRun, IndexMetadata, JobStore, StorageError, StoredJob, DATABASE_FILE};

// Service
pub use error::MatchError;
pub use sample::sample_postings;
pub use service::{Health, MatchService, ServiceStats};

// ============================================================================
// VERSION INFO
// ============================================================================

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default embedding model identifier for the local backend
pub const DEFAULT_LOCAL_MODEL: &str = "nomic-ai/nomic-embed-text-v1.5";
