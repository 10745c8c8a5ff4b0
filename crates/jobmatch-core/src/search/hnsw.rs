//! HNSW graph segment
//!
//! Uses USearch for HNSW (Hierarchical Navigable Small World) indexing.
//! A segment is built once over a fixed set of entries and never mutated;
//! later changes are tracked by the owning snapshot.

use usearch::{Index, IndexOptions, MetricKind, ScalarKind};

use super::VectorIndexError;
use crate::config::HnswParams;

/// Immutable graph over the entries present when it was built
pub(crate) struct HnswSegment {
    index: Index,
    /// Graph key (position) to entry id
    keys: Vec<String>,
}

impl HnswSegment {
    /// Build a graph over unit-length vectors
    pub(crate) fn build<'a, I>(
        params: &HnswParams,
        dimensions: usize,
        entries: I,
    ) -> Result<Self, VectorIndexError>
    where
        I: ExactSizeIterator<Item = (&'a str, &'a [f32])>,
    {
        let options = IndexOptions {
            dimensions,
            metric: MetricKind::Cos,
            quantization: ScalarKind::I8,
            connectivity: params.connectivity,
            expansion_add: params.expansion_add,
            expansion_search: params.expansion_search,
            multi: false,
        };

        let index = Index::new(&options).map_err(|e| VectorIndexError::Ann(e.to_string()))?;

        // usearch requires reserve() before add()
        index
            .reserve(entries.len().max(16))
            .map_err(|e| VectorIndexError::Ann(format!("Failed to reserve capacity: {}", e)))?;

        let mut keys = Vec::with_capacity(entries.len());
        for (id, vector) in entries {
            let key = keys.len() as u64;
            index
                .add(key, vector)
                .map_err(|e| VectorIndexError::Ann(format!("Failed to add {}: {}", id, e)))?;
            keys.push(id.to_string());
        }

        Ok(Self { index, keys })
    }

    pub(crate) fn len(&self) -> usize {
        self.keys.len()
    }

    /// Ids of the `limit` nearest graph entries, best first
    pub(crate) fn search(&self, query: &[f32], limit: usize) -> Result<Vec<&str>, VectorIndexError> {
        let limit = limit.min(self.keys.len());
        if limit == 0 {
            return Ok(Vec::new());
        }

        let results = self
            .index
            .search(query, limit)
            .map_err(|e| VectorIndexError::Ann(format!("Search failed: {}", e)))?;

        Ok(results
            .keys
            .iter()
            .filter_map(|key| self.keys.get(*key as usize).map(String::as_str))
            .collect())
    }
}

impl std::fmt::Debug for HnswSegment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HnswSegment")
            .field("entries", &self.keys.len())
            .finish()
    }
}
