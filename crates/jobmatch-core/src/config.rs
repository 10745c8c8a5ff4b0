//! Configuration
//!
//! Typed settings for every component, with defaults and a `JOBMATCH_*`
//! environment layer.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `JOBMATCH_DATA_DIR` | platform data dir |
//! | `JOBMATCH_EMBEDDING_BACKEND` | `local` (`hash` without the `embeddings` feature) |
//! | `JOBMATCH_EMBEDDING_MODEL` | `nomic-ai/nomic-embed-text-v1.5` |
//! | `JOBMATCH_EMBEDDING_ENDPOINT` | required for `remote` |
//! | `JOBMATCH_EMBEDDING_DIMENSIONS` | 256 (hash), required for `remote` |
//! | `JOBMATCH_EMBEDDING_TIMEOUT_MS` | 10000 |
//! | `JOBMATCH_EMBEDDING_API_KEY` | unset |
//! | `JOBMATCH_MAX_TEXT_CHARS` | 8192 |
//! | `JOBMATCH_SEARCH_STRATEGY` | `exact` (`exact` or `hnsw`) |
//! | `JOBMATCH_HNSW_CONNECTIVITY` / `_EXPANSION_ADD` / `_EXPANSION_SEARCH` / `_OVERSAMPLE` | 16 / 128 / 64 / 2 |
//! | `JOBMATCH_EXACT_BELOW` | 2048 |
//! | `JOBMATCH_COMPACTION_THRESHOLD` | 256 |
//! | `JOBMATCH_BUILD_WORKERS` | 4 |
//! | `JOBMATCH_CANDIDATE_MULTIPLIER` | 3 |
//! | `JOBMATCH_DEFAULT_TOP_K` / `JOBMATCH_MAX_TOP_K` | 10 / 100 |
//! | `JOBMATCH_QUERY_CACHE` | 256 |
//! | `JOBMATCH_MIN_SCORE` | unset |

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::embeddings::{DEFAULT_HASH_DIMENSIONS, MAX_TEXT_LENGTH};

// ============================================================================
// ERROR TYPES
// ============================================================================

/// Invalid configuration value
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: '{value}' ({reason})")]
    Invalid {
        key: String,
        value: String,
        reason: String,
    },
    #[error("{0} must be set")]
    Missing(&'static str),
}

// ============================================================================
// EMBEDDING
// ============================================================================

/// Models available to the local fastembed backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LocalModel {
    /// 768d output truncated to 256d (Matryoshka)
    #[default]
    NomicEmbedTextV15,
    AllMiniLmL6V2,
    BgeSmallEnV15,
}

impl LocalModel {
    pub fn model_id(&self) -> &'static str {
        match self {
            LocalModel::NomicEmbedTextV15 => "nomic-ai/nomic-embed-text-v1.5",
            LocalModel::AllMiniLmL6V2 => "sentence-transformers/all-MiniLM-L6-v2",
            LocalModel::BgeSmallEnV15 => "BAAI/bge-small-en-v1.5",
        }
    }

    /// Output dimension after any truncation
    pub fn dimensions(&self) -> usize {
        match self {
            LocalModel::NomicEmbedTextV15 => 256,
            LocalModel::AllMiniLmL6V2 => 384,
            LocalModel::BgeSmallEnV15 => 384,
        }
    }
}

impl FromStr for LocalModel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase();
        let key = key.rsplit('/').next().unwrap_or(&key);
        match key {
            "nomic" | "nomic-embed-text-v1.5" => Ok(LocalModel::NomicEmbedTextV15),
            "minilm" | "all-minilm-l6-v2" => Ok(LocalModel::AllMiniLmL6V2),
            "bge-small" | "bge-small-en-v1.5" => Ok(LocalModel::BgeSmallEnV15),
            _ => Err(format!("unknown local model '{}'", s)),
        }
    }
}

impl fmt::Display for LocalModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.model_id())
    }
}

/// Settings for an OpenAI-compatible embedding endpoint
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteConfig {
    pub endpoint: String,
    pub model: String,
    pub dimensions: usize,
    /// Per-request timeout; expiry is an embedding failure
    pub timeout_ms: u64,
    pub api_key: Option<String>,
}

/// Which provider to construct
#[derive(Debug, Clone, PartialEq)]
pub enum EmbeddingBackend {
    Hashing { dimensions: usize },
    Local { model: LocalModel },
    Remote(RemoteConfig),
}

impl Default for EmbeddingBackend {
    fn default() -> Self {
        if cfg!(feature = "embeddings") {
            EmbeddingBackend::Local {
                model: LocalModel::default(),
            }
        } else {
            EmbeddingBackend::Hashing {
                dimensions: DEFAULT_HASH_DIMENSIONS,
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingConfig {
    pub backend: EmbeddingBackend,
    /// Inputs are cut at this many characters
    pub max_text_chars: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            backend: EmbeddingBackend::default(),
            max_text_chars: MAX_TEXT_LENGTH,
        }
    }
}

impl EmbeddingConfig {
    /// Deterministic hashing backend, used by tests and offline runs
    pub fn hashing(dimensions: usize) -> Self {
        Self {
            backend: EmbeddingBackend::Hashing { dimensions },
            max_text_chars: MAX_TEXT_LENGTH,
        }
    }
}

// ============================================================================
// VECTOR INDEX
// ============================================================================

/// HNSW connectivity parameter (higher = better recall, more memory)
pub const DEFAULT_CONNECTIVITY: usize = 16;

/// HNSW expansion factor for index building
pub const DEFAULT_EXPANSION_ADD: usize = 128;

/// HNSW expansion factor for search (higher = better recall, slower)
pub const DEFAULT_EXPANSION_SEARCH: usize = 64;

/// Graph results fetched per requested neighbour before exact re-scoring
pub const DEFAULT_OVERSAMPLE: usize = 2;

/// Recall/latency knobs for the approximate graph
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HnswParams {
    pub connectivity: usize,
    pub expansion_add: usize,
    pub expansion_search: usize,
    pub oversample: usize,
}

impl Default for HnswParams {
    fn default() -> Self {
        Self {
            connectivity: DEFAULT_CONNECTIVITY,
            expansion_add: DEFAULT_EXPANSION_ADD,
            expansion_search: DEFAULT_EXPANSION_SEARCH,
            oversample: DEFAULT_OVERSAMPLE,
        }
    }
}

/// Nearest-neighbour strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchStrategy {
    /// Brute-force scan; fully deterministic
    #[default]
    Exact,
    /// HNSW graph with exact re-scoring of its candidates
    Approximate(HnswParams),
}

impl SearchStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchStrategy::Exact => "exact",
            SearchStrategy::Approximate(_) => "hnsw",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexConfig {
    pub strategy: SearchStrategy,
    /// Collections smaller than this are always scanned exactly
    pub exact_below: usize,
    /// Unindexed or stale entries tolerated before the graph is rebuilt
    pub compaction_threshold: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            strategy: SearchStrategy::Exact,
            exact_below: 2048,
            compaction_threshold: 256,
        }
    }
}

impl IndexConfig {
    pub fn exact() -> Self {
        Self::default()
    }
}

// ============================================================================
// MATCHING & BUILDING
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchConfig {
    /// Over-fetch factor absorbing hard-filter attrition
    pub candidate_multiplier: usize,
    pub default_top_k: usize,
    pub max_top_k: usize,
    /// Cached candidate embeddings
    pub query_cache_capacity: usize,
    /// Results scoring below this total are dropped
    pub min_score: Option<f64>,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            candidate_multiplier: 3,
            default_top_k: 10,
            max_top_k: 100,
            query_cache_capacity: 256,
            min_score: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuilderConfig {
    /// Size of the embedding worker pool
    pub workers: usize,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self { workers: 4 }
    }
}

// ============================================================================
// TOP LEVEL
// ============================================================================

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Config {
    /// Directory holding `jobmatch.db`; platform data dir when unset
    pub data_dir: Option<PathBuf>,
    pub embedding: EmbeddingConfig,
    pub index: IndexConfig,
    pub matching: MatchConfig,
    pub builder: BuilderConfig,
}

impl Config {
    /// Defaults overlaid with `JOBMATCH_*` environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Config::from_env`] with an injectable variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env { lookup };
        let mut config = Config::default();

        if let Some(dir) = env.get("JOBMATCH_DATA_DIR") {
            config.data_dir = Some(PathBuf::from(dir));
        }

        config.embedding.max_text_chars = env.parse_or("JOBMATCH_MAX_TEXT_CHARS", MAX_TEXT_LENGTH)?;
        let model = env.get("JOBMATCH_EMBEDDING_MODEL");
        if let Some(backend) = env.get("JOBMATCH_EMBEDDING_BACKEND") {
            config.embedding.backend = match backend.to_lowercase().as_str() {
                "hash" | "hashing" => EmbeddingBackend::Hashing {
                    dimensions: env.parse_or("JOBMATCH_EMBEDDING_DIMENSIONS", DEFAULT_HASH_DIMENSIONS)?,
                },
                "local" => EmbeddingBackend::Local {
                    model: parse_local_model(model.as_deref())?,
                },
                "remote" => EmbeddingBackend::Remote(RemoteConfig {
                    endpoint: env
                        .get("JOBMATCH_EMBEDDING_ENDPOINT")
                        .ok_or(ConfigError::Missing("JOBMATCH_EMBEDDING_ENDPOINT"))?,
                    model: model.unwrap_or_else(|| "text-embedding-3-small".to_string()),
                    dimensions: env
                        .parse::<usize>("JOBMATCH_EMBEDDING_DIMENSIONS")?
                        .ok_or(ConfigError::Missing("JOBMATCH_EMBEDDING_DIMENSIONS"))?,
                    timeout_ms: env.parse_or("JOBMATCH_EMBEDDING_TIMEOUT_MS", 10_000)?,
                    api_key: env.get("JOBMATCH_EMBEDDING_API_KEY"),
                }),
                other => {
                    return Err(ConfigError::Invalid {
                        key: "JOBMATCH_EMBEDDING_BACKEND".to_string(),
                        value: other.to_string(),
                        reason: "expected hash, local or remote".to_string(),
                    });
                }
            };
        } else if model.is_some() {
            config.embedding.backend = EmbeddingBackend::Local {
                model: parse_local_model(model.as_deref())?,
            };
        }

        if let Some(strategy) = env.get("JOBMATCH_SEARCH_STRATEGY") {
            config.index.strategy = match strategy.to_lowercase().as_str() {
                "exact" | "brute-force" => SearchStrategy::Exact,
                "hnsw" | "approximate" => SearchStrategy::Approximate(HnswParams {
                    connectivity: env.parse_or("JOBMATCH_HNSW_CONNECTIVITY", DEFAULT_CONNECTIVITY)?,
                    expansion_add: env.parse_or("JOBMATCH_HNSW_EXPANSION_ADD", DEFAULT_EXPANSION_ADD)?,
                    expansion_search: env
                        .parse_or("JOBMATCH_HNSW_EXPANSION_SEARCH", DEFAULT_EXPANSION_SEARCH)?,
                    oversample: env.parse_or("JOBMATCH_HNSW_OVERSAMPLE", DEFAULT_OVERSAMPLE)?,
                }),
                other => {
                    return Err(ConfigError::Invalid {
                        key: "JOBMATCH_SEARCH_STRATEGY".to_string(),
                        value: other.to_string(),
                        reason: "expected exact or hnsw".to_string(),
                    });
                }
            };
        }
        config.index.exact_below = env.parse_or("JOBMATCH_EXACT_BELOW", config.index.exact_below)?;
        config.index.compaction_threshold =
            env.parse_or("JOBMATCH_COMPACTION_THRESHOLD", config.index.compaction_threshold)?;

        config.builder.workers = env.parse_or("JOBMATCH_BUILD_WORKERS", config.builder.workers)?;

        let m = &mut config.matching;
        m.candidate_multiplier = env.parse_or("JOBMATCH_CANDIDATE_MULTIPLIER", m.candidate_multiplier)?;
        m.default_top_k = env.parse_or("JOBMATCH_DEFAULT_TOP_K", m.default_top_k)?;
        m.max_top_k = env.parse_or("JOBMATCH_MAX_TOP_K", m.max_top_k)?;
        m.query_cache_capacity = env.parse_or("JOBMATCH_QUERY_CACHE", m.query_cache_capacity)?;
        m.min_score = env.parse("JOBMATCH_MIN_SCORE")?;

        config.validate()?;
        Ok(config)
    }

    /// Reject values no component can work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn positive(key: &str, value: usize) -> Result<(), ConfigError> {
            if value == 0 {
                Err(ConfigError::Invalid {
                    key: key.to_string(),
                    value: "0".to_string(),
                    reason: "must be at least 1".to_string(),
                })
            } else {
                Ok(())
            }
        }

        match &self.embedding.backend {
            EmbeddingBackend::Hashing { dimensions } => positive("embedding dimensions", *dimensions)?,
            EmbeddingBackend::Remote(remote) => {
                positive("embedding dimensions", remote.dimensions)?;
                positive("embedding timeout", remote.timeout_ms as usize)?;
            }
            EmbeddingBackend::Local { .. } => {}
        }
        positive("max text chars", self.embedding.max_text_chars)?;
        if let SearchStrategy::Approximate(params) = self.index.strategy {
            positive("hnsw connectivity", params.connectivity)?;
            positive("hnsw expansion_add", params.expansion_add)?;
            positive("hnsw expansion_search", params.expansion_search)?;
            positive("hnsw oversample", params.oversample)?;
        }
        positive("build workers", self.builder.workers)?;
        positive("candidate multiplier", self.matching.candidate_multiplier)?;
        positive("max top_k", self.matching.max_top_k)?;
        positive("query cache capacity", self.matching.query_cache_capacity)?;
        if self.matching.default_top_k == 0 || self.matching.default_top_k > self.matching.max_top_k {
            return Err(ConfigError::Invalid {
                key: "default top_k".to_string(),
                value: self.matching.default_top_k.to_string(),
                reason: format!("must be between 1 and {}", self.matching.max_top_k),
            });
        }
        if let Some(min) = self.matching.min_score {
            if !(0.0..=100.0).contains(&min) {
                return Err(ConfigError::Invalid {
                    key: "min score".to_string(),
                    value: min.to_string(),
                    reason: "must be between 0 and 100".to_string(),
                });
            }
        }
        Ok(())
    }
}

fn parse_local_model(model: Option<&str>) -> Result<LocalModel, ConfigError> {
    match model {
        None => Ok(LocalModel::default()),
        Some(name) => name.parse().map_err(|reason| ConfigError::Invalid {
            key: "JOBMATCH_EMBEDDING_MODEL".to_string(),
            value: name.to_string(),
            reason,
        }),
    }
}

struct Env<F> {
    lookup: F,
}

impl<F> Env<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn get(&self, key: &str) -> Option<String> {
        (self.lookup)(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn parse<T>(&self, key: &str) -> Result<Option<T>, ConfigError>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        self.get(key)
            .map(|raw| {
                raw.parse::<T>().map_err(|e| ConfigError::Invalid {
                    key: key.to_string(),
                    value: raw.clone(),
                    reason: e.to_string(),
                })
            })
            .transpose()
    }

    fn parse_or<T>(&self, key: &str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        Ok(self.parse(key)?.unwrap_or(default))
    }
}

// ============================================================================
// TESTS
// ============================================================================
