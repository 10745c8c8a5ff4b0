//! Database Migrations
//!
//! Schema migration definitions for the job store.

/// Migration definitions
pub const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        description: "Job postings, embeddings and index metadata",
        up: MIGRATION_V1_UP,
    },
    Migration {
        version: 2,
        description: "Build run history",
        up: MIGRATION_V2_UP,
    },
];

/// A database migration
#[derive(Debug, Clone)]
pub struct Migration {
    /// Version number
    pub version: u32,
    /// Description
    pub description: &'static str,
    /// SQL to apply
    pub up: &'static str,
}

/// V1: Initial schema
const MIGRATION_V1_UP: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS job_postings (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    company TEXT NOT NULL DEFAULT '',
    region TEXT NOT NULL,
    industry TEXT NOT NULL,
    level TEXT NOT NULL,
    required_skills TEXT NOT NULL DEFAULT '[]',
    preferred_skills TEXT NOT NULL DEFAULT '[]',
    description TEXT NOT NULL DEFAULT '',

    -- Salary band (all NULL when not advertised)
    salary_min REAL,
    salary_max REAL,
    salary_currency TEXT,

    location TEXT,
    url TEXT,
    remote INTEGER NOT NULL DEFAULT 0,
    posted_at TEXT,
    indexed_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_postings_region ON job_postings(region);
CREATE INDEX IF NOT EXISTS idx_postings_industry ON job_postings(industry);
CREATE INDEX IF NOT EXISTS idx_postings_level ON job_postings(level);

-- One embedding per posting, written in the same transaction as the posting
CREATE TABLE IF NOT EXISTS job_embeddings (
    job_id TEXT PRIMARY KEY REFERENCES job_postings(id) ON DELETE CASCADE,
    embedding BLOB NOT NULL,
    dimensions INTEGER NOT NULL,
    model TEXT NOT NULL,
    created_at TEXT NOT NULL
);

-- Model and dimension the stored embeddings were produced with
CREATE TABLE IF NOT EXISTS index_metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

INSERT OR IGNORE INTO schema_version (version, applied_at) VALUES (1, datetime('now'));
"#;

/// V2: Build runs
const MIGRATION_V2_UP: &str = r#"
CREATE TABLE IF NOT EXISTS build_runs (
    id TEXT PRIMARY KEY,
    kind TEXT NOT NULL,
    started_at TEXT NOT NULL,
    duration_ms INTEGER NOT NULL,
    submitted INTEGER NOT NULL,
    indexed INTEGER NOT NULL,
    failed INTEGER NOT NULL,
    model TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_build_runs_started ON build_runs(started_at);

INSERT OR IGNORE INTO schema_version (version, applied_at) VALUES (2, datetime('now'));
"#;

/// Get current schema version from database
pub fn get_current_version(conn: &rusqlite::Connection) -> rusqlite::Result<u32> {
    conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )
    .or(Ok(0))
}

/// Apply pending migrations
pub fn apply_migrations(conn: &rusqlite::Connection) -> rusqlite::Result<u32> {
    let current_version = get_current_version(conn)?;
    let mut applied = 0;

    for migration in MIGRATIONS {
        if migration.version > current_version {
            tracing::info!(
                "Applying migration v{}: {}",
                migration.version,
                migration.description
            );

            conn.execute_batch(migration.up)?;
            applied += 1;
        }
    }

    Ok(applied)
}
