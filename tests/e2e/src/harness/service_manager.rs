//! Test Service Manager
//!
//! Provides isolated match services for testing:
//! - A temporary data directory removed on drop
//! - Reopening over the same directory to exercise persistence
//! - Direct database access for corrupting stored state

use std::path::{Path, PathBuf};
use std::sync::Arc;

use jobmatch_core::{Config, EmbeddingConfig, EmbeddingProvider, HashEmbedder, MatchService, DATABASE_FILE};
use tempfile::TempDir;

/// A [`MatchService`] over its own temporary directory
///
/// # Example
///
/// ```rust,ignore
/// let harness = TestService::new(64);
/// harness.service.rebuild(jobmatch_core::sample_postings())?;
///
/// // Same directory, fresh process state
/// let harness = harness.reopen();
/// ```
pub struct TestService {
    /// The service under test
    pub service: MatchService,
    provider: Arc<dyn EmbeddingProvider>,
    /// Kept alive so the directory outlives the service
    dir: TempDir,
}

impl TestService {
    /// Service backed by the hashing embedder
    pub fn new(dimensions: usize) -> Self {
        Self::with_provider(Arc::new(HashEmbedder::new(dimensions)))
    }

    /// Service backed by `provider`
    pub fn with_provider(provider: Arc<dyn EmbeddingProvider>) -> Self {
        let dir = TempDir::new().expect("Failed to create temp directory");
        let service = open(dir.path(), provider.clone());
        Self { service, provider, dir }
    }

    /// Drop the service and open a new one over the same directory
    pub fn reopen(self) -> Self {
        let provider = self.provider.clone();
        self.reopen_with(provider)
    }

    /// Reopen with a different provider, e.g. to change dimensions
    pub fn reopen_with(self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        let Self { service, dir, .. } = self;
        drop(service);
        let service = open(dir.path(), provider.clone());
        Self { service, provider, dir }
    }

    pub fn data_dir(&self) -> &Path {
        self.dir.path()
    }

    pub fn db_path(&self) -> PathBuf {
        self.dir.path().join(DATABASE_FILE)
    }
}

fn config(dir: &Path, dimensions: usize) -> Config {
    Config {
        data_dir: Some(dir.to_path_buf()),
        embedding: EmbeddingConfig::hashing(dimensions),
        ..Config::default()
    }
}

fn open(dir: &Path, provider: Arc<dyn EmbeddingProvider>) -> MatchService {
    MatchService::open_with_provider(config(dir, provider.dimensions()), provider)
        .expect("Failed to open test service")
}
