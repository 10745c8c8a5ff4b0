//! SQLite Job Store
//!
//! Postings and their embeddings live in two tables written inside one
//! transaction, so the `id → posting` and `id → vector` mappings can never
//! drift apart on disk.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use rusqlite::{params, Connection, OptionalExtension, Transaction};
use serde::Serialize;
use uuid::Uuid;

use crate::embeddings::Embedding;
use crate::model::{Industry, JobLevel, JobPosting, Region, SalaryRange, ValidationError};

/// Database file name inside the data directory
pub const DATABASE_FILE: &str = "jobmatch.db";

// ============================================================================
// ERROR TYPES
// ============================================================================

/// Storage error type
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
    /// Posting not found
    #[error("Posting not found: {0}")]
    NotFound(String),
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// JSON column could not be encoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    /// Persisted data is unreadable or inconsistent
    #[error("Corrupt store: {0}")]
    Corrupt(String),
    /// Initialization error
    #[error("Initialization error: {0}")]
    Init(String),
}

/// Storage result type
pub type Result<T> = std::result::Result<T, StorageError>;

// ============================================================================
// RECORDS
// ============================================================================

/// A posting together with its embedding
#[derive(Debug, Clone, PartialEq)]
pub struct StoredJob {
    pub posting: Arc<JobPosting>,
    pub vector: Vec<f32>,
}

/// Model the stored embeddings were produced with
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexMetadata {
    pub model: String,
    pub dimensions: usize,
}

/// Kind of index build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildKind {
    Rebuild,
    Incremental,
}

impl BuildKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildKind::Rebuild => "rebuild",
            BuildKind::Incremental => "incremental",
        }
    }

    fn parse_name(s: &str) -> Option<Self> {
        match s {
            "rebuild" => Some(BuildKind::Rebuild),
            "incremental" => Some(BuildKind::Incremental),
            _ => None,
        }
    }
}

/// History entry for one builder run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuildRun {
    pub id: Uuid,
    pub kind: BuildKind,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub submitted: usize,
    pub indexed: usize,
    pub failed: usize,
    pub model: String,
}

// ============================================================================
// STORE
// ============================================================================

/// SQLite-backed job store
///
/// Uses separate reader/writer connections; all methods take `&self`.
pub struct JobStore {
    writer: Mutex<Connection>,
    reader: Mutex<Connection>,
    path: PathBuf,
}

impl JobStore {
    /// Apply PRAGMAs to a connection
    fn configure_connection(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA cache_size = -64000;
             PRAGMA temp_store = MEMORY;
             PRAGMA foreign_keys = ON;
             PRAGMA busy_timeout = 5000;",
        )?;
        Ok(())
    }

    /// Default data directory for the store
    pub fn default_data_dir() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("com", "jobmatch", "core")
            .ok_or_else(|| StorageError::Init("Could not determine project directories".to_string()))?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    /// Open (or create) the store in `data_dir`, or the platform data dir
    pub fn open(data_dir: Option<PathBuf>) -> Result<Self> {
        let dir = match data_dir {
            Some(dir) => dir,
            None => Self::default_data_dir()?,
        };
        std::fs::create_dir_all(&dir)?;
        // Restrict directory permissions to owner-only on Unix
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let _ = std::fs::set_permissions(&dir, std::fs::Permissions::from_mode(0o700));
        }
        Self::open_file(dir.join(DATABASE_FILE))
    }

    /// Open (or create) the store at an explicit database path
    pub fn open_file(path: PathBuf) -> Result<Self> {
        let writer_conn = Connection::open(&path)?;

        #[cfg(unix)]
        if path.exists() {
            use std::os::unix::fs::PermissionsExt;
            let _ = std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o600));
        }

        Self::configure_connection(&writer_conn)?;

        // Apply migrations on writer only
        super::migrations::apply_migrations(&writer_conn)?;

        let reader_conn = Connection::open(&path)?;
        Self::configure_connection(&reader_conn)?;

        tracing::debug!(path = %path.display(), "Job store opened");

        Ok(Self {
            writer: Mutex::new(writer_conn),
            reader: Mutex::new(reader_conn),
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn writer(&self) -> Result<MutexGuard<'_, Connection>> {
        self.writer
            .lock()
            .map_err(|_| StorageError::Init("Writer lock poisoned".into()))
    }

    fn reader(&self) -> Result<MutexGuard<'_, Connection>> {
        self.reader
            .lock()
            .map_err(|_| StorageError::Init("Reader lock poisoned".into()))
    }

    /// Replace every posting and embedding in one transaction
    pub fn replace_all(&self, jobs: &[StoredJob], metadata: &IndexMetadata) -> Result<()> {
        let mut writer = self.writer()?;
        let tx = writer.transaction()?;
        tx.execute("DELETE FROM job_embeddings", [])?;
        tx.execute("DELETE FROM job_postings", [])?;
        Self::write_jobs(&tx, jobs, metadata)?;
        Self::write_metadata(&tx, metadata)?;
        tx.commit()?;
        Ok(())
    }

    /// Insert or replace postings and their embeddings in one transaction
    pub fn upsert(&self, jobs: &[StoredJob], metadata: &IndexMetadata) -> Result<()> {
        let mut writer = self.writer()?;
        let tx = writer.transaction()?;
        Self::write_jobs(&tx, jobs, metadata)?;
        Self::write_metadata(&tx, metadata)?;
        tx.commit()?;
        Ok(())
    }

    /// Delete a posting (its embedding cascades); false when absent
    pub fn remove(&self, id: &str) -> Result<bool> {
        let writer = self.writer()?;
        let rows = writer.execute("DELETE FROM job_postings WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    fn write_jobs(tx: &Transaction<'_>, jobs: &[StoredJob], metadata: &IndexMetadata) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        let mut posting_stmt = tx.prepare(
            "INSERT INTO job_postings (
                id, title, company, region, industry, level, required_skills, preferred_skills,
                description, salary_min, salary_max, salary_currency, location, url, remote,
                posted_at, indexed_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)
             ON CONFLICT(id) DO UPDATE SET
                title = excluded.title, company = excluded.company, region = excluded.region,
                industry = excluded.industry, level = excluded.level,
                required_skills = excluded.required_skills,
                preferred_skills = excluded.preferred_skills, description = excluded.description,
                salary_min = excluded.salary_min, salary_max = excluded.salary_max,
                salary_currency = excluded.salary_currency, location = excluded.location,
                url = excluded.url, remote = excluded.remote, posted_at = excluded.posted_at,
                indexed_at = excluded.indexed_at",
        )?;
        let mut embedding_stmt = tx.prepare(
            "INSERT OR REPLACE INTO job_embeddings (job_id, embedding, dimensions, model, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )?;

        for job in jobs {
            let p = &job.posting;
            let salary = p.salary_range.as_ref();
            posting_stmt.execute(params![
                p.id,
                p.title,
                p.company,
                p.region.as_str(),
                p.industry.as_str(),
                p.level.as_str(),
                serde_json::to_string(&p.required_skills)?,
                serde_json::to_string(&p.preferred_skills)?,
                p.description,
                salary.map(|s| s.min),
                salary.map(|s| s.max),
                salary.map(|s| s.currency.as_str()),
                p.location,
                p.url,
                p.remote,
                p.posted_at.map(|t| t.to_rfc3339()),
                now,
            ])?;

            let embedding = Embedding::new(job.vector.clone());
            embedding_stmt.execute(params![
                p.id,
                embedding.to_bytes(),
                embedding.dimensions as i64,
                metadata.model,
                now,
            ])?;
        }
        Ok(())
    }

    fn write_metadata(tx: &Transaction<'_>, metadata: &IndexMetadata) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        let mut stmt = tx.prepare(
            "INSERT OR REPLACE INTO index_metadata (key, value, updated_at) VALUES (?1, ?2, ?3)",
        )?;
        stmt.execute(params!["model", metadata.model, now])?;
        stmt.execute(params!["dimensions", metadata.dimensions.to_string(), now])?;
        Ok(())
    }

    /// Model and dimension of the stored embeddings, if anything was ever built
    pub fn metadata(&self) -> Result<Option<IndexMetadata>> {
        let reader = self.reader()?;
        let get = |key: &str| -> Result<Option<String>> {
            Ok(reader
                .query_row(
                    "SELECT value FROM index_metadata WHERE key = ?1",
                    params![key],
                    |row| row.get(0),
                )
                .optional()?)
        };

        match (get("model")?, get("dimensions")?) {
            (Some(model), Some(dimensions)) => {
                let dimensions = dimensions.parse::<usize>().map_err(|_| {
                    StorageError::Corrupt(format!("index metadata has invalid dimensions '{}'", dimensions))
                })?;
                Ok(Some(IndexMetadata { model, dimensions }))
            }
            (None, None) => Ok(None),
            _ => Err(StorageError::Corrupt("index metadata is incomplete".to_string())),
        }
    }

    /// Number of stored postings
    pub fn count(&self) -> Result<usize> {
        let reader = self.reader()?;
        let count: i64 = reader.query_row("SELECT COUNT(*) FROM job_postings", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Fetch one posting
    pub fn get(&self, id: &str) -> Result<JobPosting> {
        let reader = self.reader()?;
        let raw = reader
            .query_row(
                &format!("{} WHERE p.id = ?1", Self::SELECT_JOBS),
                params![id],
                RawJobRow::from_row,
            )
            .optional()?
            .ok_or_else(|| StorageError::NotFound(id.to_string()))?;
        Ok(raw.into_posting()?)
    }

    const SELECT_JOBS: &'static str = "SELECT p.id, p.title, p.company, p.region, p.industry, p.level,
                p.required_skills, p.preferred_skills, p.description, p.salary_min, p.salary_max,
                p.salary_currency, p.location, p.url, p.remote, p.posted_at,
                e.embedding, e.dimensions
         FROM job_postings p LEFT JOIN job_embeddings e ON e.job_id = p.id";

    /// Load every posting with its embedding
    ///
    /// Any unreadable row, missing embedding, or embedding whose dimension
    /// disagrees with the metadata is reported as [`StorageError::Corrupt`].
    pub fn load_all(&self) -> Result<Vec<StoredJob>> {
        let expected = self.metadata()?.map(|m| m.dimensions);

        let reader = self.reader()?;
        let mut stmt = reader.prepare(&format!("{} ORDER BY p.id", Self::SELECT_JOBS))?;
        let rows: Vec<RawJobRow> = stmt
            .query_map([], RawJobRow::from_row)?
            .collect::<rusqlite::Result<_>>()?;
        drop(stmt);
        drop(reader);

        rows.into_iter()
            .map(|raw| {
                let id = raw.id.clone();
                let (blob, dimensions) = match (&raw.embedding, raw.dimensions) {
                    (Some(blob), Some(dims)) => (blob.clone(), dims),
                    _ => return Err(StorageError::Corrupt(format!("posting {} has no embedding", id))),
                };
                let embedding = Embedding::from_bytes(&blob)
                    .ok_or_else(|| StorageError::Corrupt(format!("embedding for {} is malformed", id)))?;
                if embedding.dimensions as i64 != dimensions {
                    return Err(StorageError::Corrupt(format!(
                        "embedding for {} has {} values but declares {}",
                        id, embedding.dimensions, dimensions
                    )));
                }
                if let Some(expected) = expected {
                    if embedding.dimensions != expected {
                        return Err(StorageError::Corrupt(format!(
                            "embedding for {} has dimension {}, index metadata says {}",
                            id, embedding.dimensions, expected
                        )));
                    }
                }
                let posting = raw.into_posting()?;
                Ok(StoredJob {
                    posting: Arc::new(posting),
                    vector: embedding.vector,
                })
            })
            .collect()
    }

    /// Append a builder run to the history
    pub fn record_build_run(&self, run: &BuildRun) -> Result<()> {
        let writer = self.writer()?;
        writer.execute(
            "INSERT INTO build_runs (id, kind, started_at, duration_ms, submitted, indexed, failed, model)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                run.id.to_string(),
                run.kind.as_str(),
                run.started_at.to_rfc3339(),
                run.duration_ms as i64,
                run.submitted as i64,
                run.indexed as i64,
                run.failed as i64,
                run.model,
            ],
        )?;
        Ok(())
    }

    /// Most recent builder runs, newest first
    pub fn recent_build_runs(&self, limit: usize) -> Result<Vec<BuildRun>> {
        let reader = self.reader()?;
        let mut stmt = reader.prepare(
            "SELECT id, kind, started_at, duration_ms, submitted, indexed, failed, model
             FROM build_runs ORDER BY started_at DESC LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit as i64], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, i64>(3)?,
                row.get::<_, i64>(4)?,
                row.get::<_, i64>(5)?,
                row.get::<_, i64>(6)?,
                row.get::<_, String>(7)?,
            ))
        })?;

        let mut runs = Vec::new();
        for row in rows {
            let (id, kind, started_at, duration_ms, submitted, indexed, failed, model) = row?;
            runs.push(BuildRun {
                id: Uuid::parse_str(&id).map_err(|e| StorageError::Corrupt(format!("build run id {}: {}", id, e)))?,
                kind: BuildKind::parse_name(&kind)
                    .ok_or_else(|| StorageError::Corrupt(format!("unknown build kind '{}'", kind)))?,
                started_at: parse_timestamp(&started_at, "started_at")?,
                duration_ms: duration_ms.max(0) as u64,
                submitted: submitted.max(0) as usize,
                indexed: indexed.max(0) as usize,
                failed: failed.max(0) as usize,
                model,
            });
        }
        Ok(runs)
    }
}

fn parse_timestamp(value: &str, field_name: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StorageError::Corrupt(format!("invalid {} '{}': {}", field_name, value, e)))
}

/// Row as read from SQLite, before validation
struct RawJobRow {
    id: String,
    title: String,
    company: String,
    region: String,
    industry: String,
    level: String,
    required_skills: String,
    preferred_skills: String,
    description: String,
    salary_min: Option<f64>,
    salary_max: Option<f64>,
    salary_currency: Option<String>,
    location: Option<String>,
    url: Option<String>,
    remote: bool,
    posted_at: Option<String>,
    embedding: Option<Vec<u8>>,
    dimensions: Option<i64>,
}

impl RawJobRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            title: row.get(1)?,
            company: row.get(2)?,
            region: row.get(3)?,
            industry: row.get(4)?,
            level: row.get(5)?,
            required_skills: row.get(6)?,
            preferred_skills: row.get(7)?,
            description: row.get(8)?,
            salary_min: row.get(9)?,
            salary_max: row.get(10)?,
            salary_currency: row.get(11)?,
            location: row.get(12)?,
            url: row.get(13)?,
            remote: row.get(14)?,
            posted_at: row.get(15)?,
            embedding: row.get(16)?,
            dimensions: row.get(17)?,
        })
    }

    fn into_posting(self) -> Result<JobPosting> {
        let corrupt = |what: String| StorageError::Corrupt(format!("posting {}: {}", self.id, what));

        let region: Region = self.region.parse().map_err(|e: ValidationError| corrupt(e.to_string()))?;
        let industry: Industry = self.industry.parse().map_err(|e: ValidationError| corrupt(e.to_string()))?;
        let level: JobLevel = self.level.parse().map_err(|e: ValidationError| corrupt(e.to_string()))?;
        let required_skills: BTreeSet<String> = serde_json::from_str(&self.required_skills)
            .map_err(|e| corrupt(format!("required_skills: {}", e)))?;
        let preferred_skills: BTreeSet<String> = serde_json::from_str(&self.preferred_skills)
            .map_err(|e| corrupt(format!("preferred_skills: {}", e)))?;
        let salary_range = match (self.salary_min, self.salary_max) {
            (Some(min), Some(max)) => Some(SalaryRange {
                min,
                max,
                currency: self.salary_currency.clone().unwrap_or_else(|| "USD".to_string()),
            }),
            (None, None) => None,
            _ => return Err(corrupt("salary range is half empty".to_string())),
        };
        let posted_at = match &self.posted_at {
            Some(value) => Some(parse_timestamp(value, "posted_at")?),
            None => None,
        };

        Ok(JobPosting {
            id: self.id.clone(),
            title: self.title.clone(),
            company: self.company.clone(),
            region,
            industry,
            level,
            required_skills,
            preferred_skills,
            description: self.description.clone(),
            salary_range,
            location: self.location.clone(),
            url: self.url.clone(),
            remote: self.remote,
            posted_at,
        })
    }
}

// ============================================================================
// TESTS
// ============================================================================
