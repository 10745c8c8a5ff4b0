//! Match errors
//!
//! Every layer error ([`ValidationError`], [`EmbeddingError`],
//! [`VectorIndexError`], [`StorageError`]) folds into [`MatchError`].

use crate::config::ConfigError;
use crate::embeddings::EmbeddingError;
use crate::model::ValidationError;
use crate::search::VectorIndexError;
use crate::storage::StorageError;

/// Error returned by the match engine, index builder and service
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum MatchError {
    /// Request rejected before any index query
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
    /// Candidate text could not be embedded; the caller may retry
    #[error("Embedding failed: {0}")]
    EmbeddingFailure(#[from] EmbeddingError),
    /// Provider and index disagree on the vector dimension
    #[error("Dimension mismatch: provider produces {actual}, index holds {expected}")]
    DimensionMismatch { expected: usize, actual: usize },
    /// Index is unusable until an operator rebuilds it
    #[error("Service degraded: {0}")]
    Degraded(String),
    #[error("Index error: {0}")]
    Index(VectorIndexError),
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    /// The embedding worker pool could not be started
    #[error("Worker pool error: {0}")]
    WorkerPool(String),
}

impl From<VectorIndexError> for MatchError {
    fn from(err: VectorIndexError) -> Self {
        match err {
            VectorIndexError::DimensionMismatch { expected, actual } => {
                MatchError::DimensionMismatch { expected, actual }
            }
            other => MatchError::Index(other),
        }
    }
}

impl MatchError {
    /// Whether retrying the same request may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            MatchError::EmbeddingFailure(EmbeddingError::Timeout(_) | EmbeddingError::Backend(_))
        )
    }
}

