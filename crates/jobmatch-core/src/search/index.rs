//! Snapshot-swapped vector index
//!
//! Readers clone an `Arc<Snapshot>` under a momentary read lock and then work
//! lock-free. Writers serialize on a writer mutex, modify a private copy of
//! the current snapshot and publish it with a single pointer swap, so a
//! reader sees either the old or the new content, never a mix.
//!
//! Vectors are L2-normalized once on insertion; similarity at query time is
//! a dot product.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use super::VectorIndexError;
use crate::config::{IndexConfig, SearchStrategy};
use crate::embeddings::dot_product;

#[cfg(feature = "vector-search")]
use super::hnsw::HnswSegment;

// ============================================================================
// TYPES
// ============================================================================

/// One search hit
#[derive(Debug, Clone, PartialEq)]
pub struct Neighbor<P> {
    pub id: String,
    /// Cosine similarity in [-1, 1]
    pub similarity: f32,
    pub payload: P,
}

#[derive(Debug, Clone)]
struct Entry<P> {
    vector: Arc<[f32]>,
    payload: P,
}

/// Index statistics
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct IndexStats {
    pub entries: usize,
    pub dimensions: usize,
    pub version: u64,
    pub strategy: &'static str,
    /// Entries reachable through the HNSW graph
    pub graph_entries: usize,
    /// Entries added or replaced since the graph was built
    pub pending: usize,
    /// Graph entries that were removed or replaced since
    pub stale: usize,
}

// ============================================================================
// SNAPSHOT
// ============================================================================

/// Immutable published view of the index
#[derive(Debug)]
pub struct Snapshot<P> {
    version: u64,
    dimensions: usize,
    entries: BTreeMap<String, Entry<P>>,
    /// Entries not covered by `graph`; scanned exactly
    pending: BTreeSet<String>,
    /// Graph keys that no longer point at a live, unchanged entry
    stale: usize,
    /// Graph hits fetched per requested neighbour
    #[cfg_attr(not(feature = "vector-search"), allow(dead_code))]
    oversample: usize,
    #[cfg(feature = "vector-search")]
    graph: Option<Arc<HnswSegment>>,
}

impl<P: Clone> Clone for Snapshot<P> {
    fn clone(&self) -> Self {
        Self {
            version: self.version,
            dimensions: self.dimensions,
            entries: self.entries.clone(),
            pending: self.pending.clone(),
            stale: self.stale,
            oversample: self.oversample,
            #[cfg(feature = "vector-search")]
            graph: self.graph.clone(),
        }
    }
}

impl<P: Clone> Snapshot<P> {
    fn empty(dimensions: usize, version: u64) -> Self {
        Self {
            version,
            dimensions,
            entries: BTreeMap::new(),
            pending: BTreeSet::new(),
            stale: 0,
            oversample: crate::config::DEFAULT_OVERSAMPLE,
            #[cfg(feature = "vector-search")]
            graph: None,
        }
    }

    /// Monotonic publish counter
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&P> {
        self.entries.get(id).map(|e| &e.payload)
    }

    /// Stored (normalized) vector for `id`
    pub fn vector(&self, id: &str) -> Option<&[f32]> {
        self.entries.get(id).map(|e| e.vector.as_ref())
    }

    /// Entries in ascending id order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[f32], &P)> {
        self.entries
            .iter()
            .map(|(id, e)| (id.as_str(), e.vector.as_ref(), &e.payload))
    }

    pub fn payloads(&self) -> impl Iterator<Item = &P> {
        self.entries.values().map(|e| &e.payload)
    }

    fn graph_len(&self) -> usize {
        #[cfg(feature = "vector-search")]
        {
            self.graph.as_ref().map_or(0, |g| g.len())
        }
        #[cfg(not(feature = "vector-search"))]
        {
            0
        }
    }

    /// Top `k` entries by cosine similarity, ties by ascending id
    ///
    /// Fails with `EmptyIndex` when there are no entries. Returns fewer than
    /// `k` hits when fewer entries exist.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor<P>>, VectorIndexError> {
        let query = normalized(query, self.dimensions, "query")?;
        if self.entries.is_empty() {
            return Err(VectorIndexError::EmptyIndex);
        }
        if k == 0 {
            return Ok(Vec::new());
        }

        #[cfg(feature = "vector-search")]
        if let Some(graph) = &self.graph {
            return self.search_graph(graph, &query, k);
        }

        let scored = self
            .entries
            .iter()
            .map(|(id, e)| (id.as_str(), dot_product(&query, &e.vector)))
            .collect();
        Ok(self.top_k(scored, k))
    }

    #[cfg(feature = "vector-search")]
    fn search_graph(
        &self,
        graph: &HnswSegment,
        query: &[f32],
        k: usize,
    ) -> Result<Vec<Neighbor<P>>, VectorIndexError> {
        // Stale keys may occupy result slots, so over-fetch by their count
        let limit = k.saturating_mul(self.oversample).saturating_add(self.stale);
        let mut seen: BTreeSet<&str> = BTreeSet::new();
        let mut scored: Vec<(&str, f32)> = Vec::with_capacity(limit + self.pending.len());

        for id in graph.search(query, limit)? {
            if self.pending.contains(id) || !seen.insert(id) {
                continue;
            }
            if let Some((key, entry)) = self.entries.get_key_value(id) {
                scored.push((key.as_str(), dot_product(query, &entry.vector)));
            }
        }
        for id in &self.pending {
            if let Some(entry) = self.entries.get(id) {
                scored.push((id.as_str(), dot_product(query, &entry.vector)));
            }
        }

        Ok(self.top_k(scored, k))
    }

    fn top_k(&self, mut scored: Vec<(&str, f32)>, k: usize) -> Vec<Neighbor<P>> {
        let order = |a: &(&str, f32), b: &(&str, f32)| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0));

        if scored.len() > k {
            scored.select_nth_unstable_by(k - 1, order);
            scored.truncate(k);
        }
        scored.sort_unstable_by(order);

        scored
            .into_iter()
            .filter_map(|(id, similarity)| {
                self.entries.get(id).map(|e| Neighbor {
                    id: id.to_string(),
                    similarity: similarity.clamp(-1.0, 1.0),
                    payload: e.payload.clone(),
                })
            })
            .collect()
    }

    fn stats(&self, strategy: &SearchStrategy) -> IndexStats {
        IndexStats {
            entries: self.entries.len(),
            dimensions: self.dimensions,
            version: self.version,
            strategy: strategy.as_str(),
            graph_entries: self.graph_len(),
            pending: self.pending.len(),
            stale: self.stale,
        }
    }

    // ------------------------------------------------------------------------
    // Draft mutations (only ever applied to a private copy)
    // ------------------------------------------------------------------------

    fn has_graph(&self) -> bool {
        #[cfg(feature = "vector-search")]
        {
            self.graph.is_some()
        }
        #[cfg(not(feature = "vector-search"))]
        {
            false
        }
    }

    fn put(&mut self, id: String, vector: Arc<[f32]>, payload: P) {
        if self.has_graph() {
            let covered_by_graph = self.entries.contains_key(&id) && !self.pending.contains(&id);
            if covered_by_graph {
                self.stale += 1;
            }
            self.pending.insert(id.clone());
        }
        self.entries.insert(id, Entry { vector, payload });
    }

    fn take(&mut self, id: &str) -> bool {
        if self.entries.remove(id).is_none() {
            return false;
        }
        if self.has_graph() && !self.pending.remove(id) {
            self.stale += 1;
        }
        true
    }

    /// Rebuild the graph when the strategy asks for one and the backlog is
    /// too large; otherwise leave the draft alone
    fn maintain(&mut self, config: &IndexConfig) {
        match config.strategy {
            SearchStrategy::Exact => self.drop_graph(),
            SearchStrategy::Approximate(params) => {
                if self.entries.len() < config.exact_below {
                    self.drop_graph();
                    return;
                }
                let backlog = self.pending.len() + self.stale;
                if !self.has_graph() || backlog > config.compaction_threshold {
                    self.build_graph(&params);
                }
            }
        }
    }

    fn drop_graph(&mut self) {
        #[cfg(feature = "vector-search")]
        {
            self.graph = None;
        }
        self.pending.clear();
        self.stale = 0;
    }

    #[cfg(feature = "vector-search")]
    fn build_graph(&mut self, params: &crate::config::HnswParams) {
        self.oversample = params.oversample.max(1);
        let entries = self.entries.iter().map(|(id, e)| (id.as_str(), e.vector.as_ref()));
        match HnswSegment::build(params, self.dimensions, entries) {
            Ok(graph) => {
                tracing::debug!(entries = graph.len(), "Built HNSW segment");
                self.graph = Some(Arc::new(graph));
                self.pending.clear();
                self.stale = 0;
            }
            Err(e) => {
                tracing::warn!("HNSW build failed, falling back to exact search: {}", e);
                self.drop_graph();
            }
        }
    }

    #[cfg(not(feature = "vector-search"))]
    fn build_graph(&mut self, _params: &crate::config::HnswParams) {
        self.drop_graph();
    }
}

// ============================================================================
// VECTOR INDEX
// ============================================================================

/// Concurrent id → vector index with an optional payload per entry
pub struct VectorIndex<P = ()> {
    config: IndexConfig,
    current: RwLock<Arc<Snapshot<P>>>,
    writer: Mutex<()>,
}

impl<P: Clone> VectorIndex<P> {
    /// Create an empty index for vectors of length `dimensions`
    pub fn new(dimensions: usize, config: IndexConfig) -> Self {
        #[cfg(not(feature = "vector-search"))]
        if matches!(config.strategy, SearchStrategy::Approximate(_)) {
            tracing::warn!("HNSW requested but the `vector-search` feature is disabled; using exact search");
        }

        Self {
            config,
            current: RwLock::new(Arc::new(Snapshot::empty(dimensions, 0))),
            writer: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    /// Current published snapshot
    pub fn snapshot(&self) -> Arc<Snapshot<P>> {
        // The guarded value is an immutable Arc, so a poisoned lock is still consistent
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn dimensions(&self) -> usize {
        self.snapshot().dimensions()
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.snapshot().contains(id)
    }

    pub fn stats(&self) -> IndexStats {
        self.snapshot().stats(&self.config.strategy)
    }

    /// See [`Snapshot::search`]
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor<P>>, VectorIndexError> {
        self.snapshot().search(query, k)
    }

    /// Insert or replace one entry
    ///
    /// Fails with `DimensionMismatch` when `vector.len()` differs from the
    /// index dimension; the index is unchanged on any error.
    pub fn insert(&self, id: impl Into<String>, vector: &[f32], payload: P) -> Result<(), VectorIndexError> {
        let id = id.into();
        self.write(|draft| {
            let vector = normalized(vector, draft.dimensions, &id)?;
            draft.put(id, vector, payload);
            Ok(())
        })
    }

    /// Insert or replace several entries, all or nothing
    pub fn insert_batch<I>(&self, entries: I) -> Result<usize, VectorIndexError>
    where
        I: IntoIterator<Item = (String, Vec<f32>, P)>,
    {
        let entries: Vec<(String, Vec<f32>, P)> = entries.into_iter().collect();
        if entries.is_empty() {
            return Ok(0);
        }
        self.write(|draft| {
            let mut staged = Vec::with_capacity(entries.len());
            for (id, vector, payload) in entries {
                let vector = normalized(&vector, draft.dimensions, &id)?;
                staged.push((id, vector, payload));
            }
            let count = staged.len();
            for (id, vector, payload) in staged {
                draft.put(id, vector, payload);
            }
            Ok(count)
        })
    }

    /// Delete an entry; returns whether it existed
    pub fn remove(&self, id: &str) -> bool {
        if !self.contains(id) {
            return false;
        }
        self.write(|draft| Ok(draft.take(id))).unwrap_or(false)
    }

    /// Atomically replace the entire content
    pub fn rebuild<I>(&self, entries: I) -> Result<usize, VectorIndexError>
    where
        I: IntoIterator<Item = (String, Vec<f32>, P)>,
    {
        let dimensions = self.dimensions();
        self.rebuild_with_dimensions(dimensions, entries)
    }

    /// Atomically replace the entire content and change the dimension
    ///
    /// Used for a full reindex after the embedding model changed.
    pub fn rebuild_with_dimensions<I>(&self, dimensions: usize, entries: I) -> Result<usize, VectorIndexError>
    where
        I: IntoIterator<Item = (String, Vec<f32>, P)>,
    {
        let _guard = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        let version = self.snapshot().version + 1;

        let mut draft = Snapshot::empty(dimensions, version);
        for (id, vector, payload) in entries {
            let vector = normalized(&vector, dimensions, &id)?;
            draft.entries.insert(id, Entry { vector, payload });
        }
        draft.maintain(&self.config);

        let count = draft.len();
        self.publish(draft);
        tracing::debug!(entries = count, version, "Vector index rebuilt");
        Ok(count)
    }

    fn write<R, F>(&self, apply: F) -> Result<R, VectorIndexError>
    where
        F: FnOnce(&mut Snapshot<P>) -> Result<R, VectorIndexError>,
    {
        let _guard = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        let mut draft = (*self.snapshot()).clone();
        let result = apply(&mut draft)?;
        draft.version += 1;
        draft.maintain(&self.config);
        self.publish(draft);
        Ok(result)
    }

    fn publish(&self, snapshot: Snapshot<P>) {
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        *current = Arc::new(snapshot);
    }
}

impl VectorIndex<()> {
    /// Insert or replace a bare vector
    pub fn add(&self, id: impl Into<String>, vector: &[f32]) -> Result<(), VectorIndexError> {
        self.insert(id, vector, ())
    }
}

// ============================================================================
// VECTOR HELPERS
// ============================================================================

fn normalized(vector: &[f32], dimensions: usize, id: &str) -> Result<Arc<[f32]>, VectorIndexError> {
    if vector.len() != dimensions {
        return Err(VectorIndexError::DimensionMismatch {
            expected: dimensions,
            actual: vector.len(),
        });
    }
    if vector.iter().any(|x| !x.is_finite()) {
        return Err(VectorIndexError::InvalidVector(format!("{}: non-finite component", id)));
    }
    let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm == 0.0 || !norm.is_finite() {
        return Err(VectorIndexError::InvalidVector(format!("{}: zero-length vector", id)));
    }
    Ok(vector.iter().map(|x| x / norm).collect())
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn create_test_vector(seed: f32, dims: usize) -> Vec<f32> {
        (0..dims).map(|i| ((i as f32 + seed) * 0.37).sin()).collect()
    }

    fn exact(dims: usize) -> VectorIndex {
        VectorIndex::new(dims, IndexConfig::exact())
    }

    #[test]
    fn test_add_and_search() {
        let index = exact(8);
        index.add("job-1", &create_test_vector(1.0, 8)).unwrap();
        index.add("job-2", &create_test_vector(2.0, 8)).unwrap();
        index.add("job-3", &create_test_vector(3.0, 8)).unwrap();

        let results = index.search(&create_test_vector(1.0, 8), 3).unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].id, "job-1");
        assert!((results[0].similarity - 1.0).abs() < 1e-5);
        assert!(results.windows(2).all(|w| w[0].similarity >= w[1].similarity));
    }

    #[test]
    fn test_empty_index() {
        let index = exact(4);
        assert_eq!(index.search(&[1.0, 0.0, 0.0, 0.0], 5), Err(VectorIndexError::EmptyIndex));
    }

    #[test]
    fn test_fewer_entries_than_k() {
        let index = exact(4);
        index.add("a", &[1.0, 0.0, 0.0, 0.0]).unwrap();
        index.add("b", &[0.0, 1.0, 0.0, 0.0]).unwrap();
        assert_eq!(index.search(&[1.0, 1.0, 0.0, 0.0], 10).unwrap().len(), 2);
        assert!(index.search(&[1.0, 1.0, 0.0, 0.0], 0).unwrap().is_empty());
    }

    #[test]
    fn test_dimension_mismatch_leaves_index_unchanged() {
        let index = exact(4);
        index.add("a", &[1.0, 0.0, 0.0, 0.0]).unwrap();
        let version = index.snapshot().version();

        let err = index.add("b", &[1.0, 0.0]).unwrap_err();
        assert_eq!(err, VectorIndexError::DimensionMismatch { expected: 4, actual: 2 });
        assert_eq!(index.len(), 1);
        assert_eq!(index.snapshot().version(), version);

        assert!(matches!(
            index.search(&[1.0, 0.0], 1),
            Err(VectorIndexError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_zero_vector_rejected() {
        let index = exact(3);
        assert!(matches!(index.add("z", &[0.0, 0.0, 0.0]), Err(VectorIndexError::InvalidVector(_))));
        assert!(matches!(index.add("n", &[f32::NAN, 1.0, 0.0]), Err(VectorIndexError::InvalidVector(_))));
        assert!(index.is_empty());
    }

    #[test]
    fn test_batch_is_all_or_nothing() {
        let index = exact(2);
        let result = index.insert_batch(vec![
            ("a".to_string(), vec![1.0, 0.0], ()),
            ("b".to_string(), vec![1.0], ()),
        ]);
        assert!(result.is_err());
        assert!(index.is_empty());
    }

    #[test]
    fn test_ties_break_by_ascending_id() {
        let index = exact(2);
        for id in ["job-c", "job-a", "job-b"] {
            index.add(id, &[0.6, 0.8]).unwrap();
        }
        let ids: Vec<String> = index.search(&[0.6, 0.8], 3).unwrap().into_iter().map(|n| n.id).collect();
        assert_eq!(ids, vec!["job-a", "job-b", "job-c"]);
    }

    #[test]
    fn test_add_is_idempotent() {
        let index = exact(8);
        index.add("a", &create_test_vector(1.0, 8)).unwrap();
        index.add("b", &create_test_vector(5.0, 8)).unwrap();
        let before = index.search(&create_test_vector(2.0, 8), 2).unwrap();
        index.add("a", &create_test_vector(1.0, 8)).unwrap();
        let after = index.search(&create_test_vector(2.0, 8), 2).unwrap();
        assert_eq!(before, after);
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn test_remove() {
        let index = exact(2);
        index.add("a", &[1.0, 0.0]).unwrap();
        assert!(index.remove("a"));
        assert!(!index.remove("a"));
        assert!(!index.remove("never-there"));
        assert!(index.is_empty());
    }

    #[test]
    fn test_rebuild_replaces_everything() {
        let index = exact(2);
        index.add("old", &[1.0, 0.0]).unwrap();
        let count = index
            .rebuild(vec![("new".to_string(), vec![0.0, 1.0], ())])
            .unwrap();
        assert_eq!(count, 1);
        assert!(!index.contains("old"));
        assert_eq!(index.search(&[0.0, 1.0], 1).unwrap()[0].id, "new");
    }

    #[test]
    fn test_rebuild_with_new_dimensions() {
        let index = exact(2);
        index.add("a", &[1.0, 0.0]).unwrap();
        index
            .rebuild_with_dimensions(3, vec![("a".to_string(), vec![0.0, 0.0, 1.0], ())])
            .unwrap();
        assert_eq!(index.dimensions(), 3);
        assert!(index.add("b", &[1.0, 0.0]).is_err());
    }

    #[test]
    fn test_vectors_are_normalized_on_insert() {
        let index = exact(2);
        index.add("a", &[3.0, 4.0]).unwrap();
        let snapshot = index.snapshot();
        let v = snapshot.vector("a").unwrap();
        assert!((v[0] - 0.6).abs() < 1e-6 && (v[1] - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_snapshot_is_isolated_from_later_writes() {
        let index: VectorIndex<u32> = VectorIndex::new(2, IndexConfig::exact());
        index.insert("a", &[1.0, 0.0], 7).unwrap();
        let before = index.snapshot();
        index.rebuild(vec![("b".to_string(), vec![0.0, 1.0], 9)]).unwrap();

        assert_eq!(before.get("a"), Some(&7));
        assert!(!before.contains("b"));
        assert_eq!(index.snapshot().get("b"), Some(&9));
    }

    #[test]
    fn test_concurrent_readers_during_rebuild() {
        let index = Arc::new(exact(2));
        index
            .rebuild((0..50).map(|i| (format!("old-{:02}", i), vec![1.0, 0.0], ())))
            .unwrap();

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let index = Arc::clone(&index);
                thread::spawn(move || {
                    for _ in 0..200 {
                        let hits = index.search(&[1.0, 0.0], 100).unwrap();
                        let old = hits.iter().filter(|h| h.id.starts_with("old")).count();
                        assert!(old == 0 || old == hits.len(), "mixed snapshot observed");
                        assert_eq!(hits.len(), 50);
                    }
                })
            })
            .collect();

        for round in 0..20 {
            let prefix = if round % 2 == 0 { "new" } else { "old" };
            index
                .rebuild((0..50).map(|i| (format!("{}-{:02}", prefix, i), vec![1.0, 0.0], ())))
                .unwrap();
        }

        for reader in readers {
            reader.join().unwrap();
        }
    }

    #[cfg(feature = "vector-search")]
    mod approximate {
        use super::*;
        use crate::config::HnswParams;

        fn hnsw(dims: usize) -> VectorIndex {
            VectorIndex::new(
                dims,
                IndexConfig {
                    strategy: SearchStrategy::Approximate(HnswParams::default()),
                    exact_below: 10,
                    compaction_threshold: 5,
                },
            )
        }

        #[test]
        fn test_graph_built_past_threshold() {
            let index = hnsw(16);
            index
                .rebuild((0..40).map(|i| (format!("job-{:03}", i), create_test_vector(i as f32, 16), ())))
                .unwrap();
            let stats = index.stats();
            assert_eq!(stats.graph_entries, 40);
            assert_eq!(stats.strategy, "hnsw");

            let hits = index.search(&create_test_vector(7.0, 16), 1).unwrap();
            assert_eq!(hits[0].id, "job-007");
            assert!((hits[0].similarity - 1.0).abs() < 1e-4);
        }

        #[test]
        fn test_pending_entries_are_searched() {
            let index = hnsw(16);
            index
                .rebuild((0..40).map(|i| (format!("job-{:03}", i), create_test_vector(i as f32, 16), ())))
                .unwrap();
            index.add("fresh", &create_test_vector(100.0, 16)).unwrap();
            assert_eq!(index.stats().pending, 1);
            assert_eq!(index.search(&create_test_vector(100.0, 16), 1).unwrap()[0].id, "fresh");
        }

        #[test]
        fn test_removed_entries_never_returned() {
            let index = hnsw(16);
            index
                .rebuild((0..40).map(|i| (format!("job-{:03}", i), create_test_vector(i as f32, 16), ())))
                .unwrap();
            assert!(index.remove("job-007"));
            let hits = index.search(&create_test_vector(7.0, 16), 5).unwrap();
            assert!(hits.iter().all(|h| h.id != "job-007"));
        }

        #[test]
        fn test_compaction_resets_backlog() {
            let index = hnsw(16);
            index
                .rebuild((0..40).map(|i| (format!("job-{:03}", i), create_test_vector(i as f32, 16), ())))
                .unwrap();
            for i in 0..6 {
                index.add(format!("extra-{}", i), &create_test_vector(200.0 + i as f32, 16)).unwrap();
            }
            let stats = index.stats();
            assert_eq!(stats.pending, 0);
            assert_eq!(stats.graph_entries, 46);
        }
    }
}
