//! Storage Module
//!
//! SQLite-based persistence of the job catalogue:
//! - Postings and embeddings written in one transaction
//! - Index metadata (embedding model and dimension)
//! - Build run history

mod migrations;
mod sqlite;

pub use migrations::MIGRATIONS;
pub use sqlite::{
    BuildKind, BuildRun, IndexMetadata, JobStore, Result, StorageError, StoredJob, DATABASE_FILE,
};
