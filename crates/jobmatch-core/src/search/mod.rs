//! Vector Search Module
//!
//! Nearest-neighbour index over job embeddings:
//! - Exact brute-force scan (default, deterministic)
//! - HNSW approximate search via USearch (feature `vector-search`)
//! - Copy-on-write snapshots published by atomic pointer swap

#[cfg(feature = "vector-search")]
mod hnsw;
mod index;

use std::sync::Arc;

pub use index::{IndexStats, Neighbor, Snapshot, VectorIndex};

use crate::model::JobPosting;

/// Index whose entries carry their posting, so vectors and postings are
/// always published together
pub type JobIndex = VectorIndex<Arc<JobPosting>>;

/// Snapshot of a [`JobIndex`]
pub type JobSnapshot = Snapshot<Arc<JobPosting>>;

/// Vector index error types
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum VectorIndexError {
    /// Vector length differs from the index dimension
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
    /// Search against an index with zero entries
    #[error("Vector index is empty")]
    EmptyIndex,
    /// Zero-length or non-finite vector
    #[error("Invalid vector {0}")]
    InvalidVector(String),
    /// Failure inside the approximate graph
    #[error("HNSW error: {0}")]
    Ann(String),
}
