//! Database schema definitions and migrations
//!
//! This module contains all SQL schema definitions for the Page-Audit database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Pages registered for auditing, unique per project
CREATE TABLE IF NOT EXISTS pages (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    project TEXT NOT NULL,
    url TEXT NOT NULL,
    normalized_url TEXT NOT NULL,
    latest_score INTEGER,
    created_at TEXT NOT NULL,
    UNIQUE(project, normalized_url)
);

CREATE INDEX IF NOT EXISTS idx_pages_project ON pages(project);

-- Groups of runs created together
CREATE TABLE IF NOT EXISTS batches (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    project TEXT NOT NULL,
    status TEXT NOT NULL,
    total_urls INTEGER NOT NULL,
    completed INTEGER NOT NULL DEFAULT 0,
    failed INTEGER NOT NULL DEFAULT 0,
    config_hash TEXT NOT NULL,
    created_at TEXT NOT NULL,
    completed_at TEXT,
    CHECK (completed + failed <= total_urls)
);

CREATE INDEX IF NOT EXISTS idx_batches_project ON batches(project);

-- One audit of one page
CREATE TABLE IF NOT EXISTS runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    page_id INTEGER NOT NULL REFERENCES pages(id),
    batch_id INTEGER REFERENCES batches(id),
    status TEXT NOT NULL,
    created_at TEXT NOT NULL,
    started_at TEXT,
    completed_at TEXT,
    http_status INTEGER,
    response_time_ms INTEGER,
    final_url TEXT,
    html_snapshot TEXT,
    error_message TEXT
);

CREATE INDEX IF NOT EXISTS idx_runs_page ON runs(page_id);
CREATE INDEX IF NOT EXISTS idx_runs_batch ON runs(batch_id);

-- Check results of completed runs
CREATE TABLE IF NOT EXISTS run_checks (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    run_id INTEGER NOT NULL REFERENCES runs(id),
    position INTEGER NOT NULL,
    check_id TEXT NOT NULL,
    category TEXT NOT NULL,
    status TEXT NOT NULL,
    severity TEXT NOT NULL,
    message TEXT NOT NULL,
    evidence TEXT,
    fix_hint TEXT,
    UNIQUE(run_id, check_id)
);

CREATE INDEX IF NOT EXISTS idx_run_checks_run ON run_checks(run_id);

-- Scores of completed runs
CREATE TABLE IF NOT EXISTS run_scores (
    run_id INTEGER PRIMARY KEY REFERENCES runs(id),
    overall INTEGER NOT NULL,
    indexability INTEGER NOT NULL,
    metadata INTEGER NOT NULL,
    content INTEGER NOT NULL,
    schema_score INTEGER NOT NULL,
    variant_risk INTEGER NOT NULL,
    ai_readiness INTEGER NOT NULL
);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
