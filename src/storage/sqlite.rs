//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Storage trait.
//! Every status change is a single `UPDATE .. WHERE status = <expected>`, so
//! the row count tells whether the transition was legal.

use crate::audit::{AuditScore, Category, CheckResult, CheckStatus, Evidence, Severity};
use crate::state::{BatchStatus, RunStatus};
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Storage, StorageError, StorageResult};
use crate::storage::{BatchRecord, PageRecord, RunCompletion, RunRecord};
use chrono::Utc;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

const PAGE_COLUMNS: &str =
    "SELECT id, project, url, normalized_url, latest_score, created_at FROM pages";

const BATCH_COLUMNS: &str = "SELECT id, project, status, total_urls, completed, failed,
     config_hash, created_at, completed_at FROM batches";

const RUN_COLUMNS: &str = "SELECT r.id, r.page_id, r.batch_id, p.url, r.status, r.created_at,
     r.started_at, r.completed_at, r.http_status, r.response_time_ms, r.final_url,
     r.error_message
     FROM runs r JOIN pages p ON p.id = r.page_id";

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        // Configure SQLite for better performance
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
            PRAGMA mmap_size = 268435456;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

fn now() -> String {
    Utc::now().to_rfc3339()
}

/// Builds a conversion error for an unrecognised enum column
fn invalid_column(index: usize, kind: &str, value: &str) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        index,
        Type::Text,
        format!("unknown {} '{}'", kind, value).into(),
    )
}

fn page_from_row(row: &Row<'_>) -> rusqlite::Result<PageRecord> {
    Ok(PageRecord {
        id: row.get(0)?,
        project: row.get(1)?,
        url: row.get(2)?,
        normalized_url: row.get(3)?,
        latest_score: row.get(4)?,
        created_at: row.get(5)?,
    })
}

fn batch_from_row(row: &Row<'_>) -> rusqlite::Result<BatchRecord> {
    let status: String = row.get(2)?;
    Ok(BatchRecord {
        id: row.get(0)?,
        project: row.get(1)?,
        status: BatchStatus::from_db_string(&status)
            .ok_or_else(|| invalid_column(2, "batch status", &status))?,
        total_urls: row.get(3)?,
        completed: row.get(4)?,
        failed: row.get(5)?,
        config_hash: row.get(6)?,
        created_at: row.get(7)?,
        completed_at: row.get(8)?,
    })
}

fn run_from_row(row: &Row<'_>) -> rusqlite::Result<RunRecord> {
    let status: String = row.get(4)?;
    let response_time: Option<i64> = row.get(9)?;
    Ok(RunRecord {
        id: row.get(0)?,
        page_id: row.get(1)?,
        batch_id: row.get(2)?,
        url: row.get(3)?,
        status: RunStatus::from_db_string(&status)
            .ok_or_else(|| invalid_column(4, "run status", &status))?,
        created_at: row.get(5)?,
        started_at: row.get(6)?,
        completed_at: row.get(7)?,
        http_status: row.get(8)?,
        response_time_ms: response_time.map(|ms| ms.max(0) as u64),
        final_url: row.get(10)?,
        error_message: row.get(11)?,
    })
}

fn fetch_page(conn: &Connection, page_id: i64) -> StorageResult<PageRecord> {
    conn.query_row(
        &format!("{} WHERE id = ?1", PAGE_COLUMNS),
        params![page_id],
        page_from_row,
    )
    .optional()?
    .ok_or(StorageError::PageNotFound(page_id))
}

fn fetch_batch(conn: &Connection, batch_id: i64) -> StorageResult<BatchRecord> {
    conn.query_row(
        &format!("{} WHERE id = ?1", BATCH_COLUMNS),
        params![batch_id],
        batch_from_row,
    )
    .optional()?
    .ok_or(StorageError::BatchNotFound(batch_id))
}

fn fetch_run(conn: &Connection, run_id: i64) -> StorageResult<RunRecord> {
    conn.query_row(
        &format!("{} WHERE r.id = ?1", RUN_COLUMNS),
        params![run_id],
        run_from_row,
    )
    .optional()?
    .ok_or(StorageError::RunNotFound(run_id))
}

fn fetch_batch_runs(conn: &Connection, batch_id: i64) -> StorageResult<Vec<RunRecord>> {
    let mut stmt = conn.prepare(&format!("{} WHERE r.batch_id = ?1 ORDER BY r.id", RUN_COLUMNS))?;
    let runs = stmt
        .query_map(params![batch_id], run_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(runs)
}

/// Explains why a guarded run update touched no rows
fn run_transition_error(conn: &Connection, run_id: i64, to: RunStatus) -> StorageError {
    match fetch_run(conn, run_id) {
        Ok(run) => StorageError::InvalidTransition {
            from: run.status,
            to,
        },
        Err(e) => e,
    }
}

/// Explains why a guarded batch update touched no rows
fn batch_update_error(conn: &Connection, batch_id: i64, to: BatchStatus) -> StorageError {
    match fetch_batch(conn, batch_id) {
        Ok(batch) if !batch.status.can_transition_to(to) => StorageError::InvalidBatchTransition {
            from: batch.status,
            to,
        },
        Ok(batch) => StorageError::ConstraintViolation(format!(
            "batch {} has {} of {} runs finished",
            batch.id,
            batch.finished(),
            batch.total_urls
        )),
        Err(e) => e,
    }
}

impl SqliteStorage {
    fn increment_batch_counter(&mut self, batch_id: i64, column: &str) -> StorageResult<()> {
        let updated = self.conn.execute(
            &format!(
                "UPDATE batches SET {col} = {col} + 1
                 WHERE id = ?1 AND status = ?2 AND completed + failed < total_urls",
                col = column
            ),
            params![batch_id, BatchStatus::Running.to_db_string()],
        )?;

        if updated == 0 {
            let batch = fetch_batch(&self.conn, batch_id)?;
            return Err(StorageError::ConstraintViolation(format!(
                "cannot count another run for batch {} ({}, {} of {} finished)",
                batch.id,
                batch.status,
                batch.finished(),
                batch.total_urls
            )));
        }
        Ok(())
    }
}

impl Storage for SqliteStorage {
    // ===== Page Registry =====

    fn register_page(
        &mut self,
        project: &str,
        url: &str,
        normalized_url: &str,
    ) -> StorageResult<(i64, bool)> {
        let existing: Option<i64> = self
            .conn
            .query_row(
                "SELECT id FROM pages WHERE project = ?1 AND normalized_url = ?2",
                params![project, normalized_url],
                |row| row.get(0),
            )
            .optional()?;

        if let Some(id) = existing {
            return Ok((id, false));
        }

        self.conn.execute(
            "INSERT INTO pages (project, url, normalized_url, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![project, url, normalized_url, now()],
        )?;

        Ok((self.conn.last_insert_rowid(), true))
    }

    fn get_page(&self, page_id: i64) -> StorageResult<PageRecord> {
        fetch_page(&self.conn, page_id)
    }

    fn list_project_pages(&self, project: &str) -> StorageResult<Vec<PageRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{} WHERE project = ?1 ORDER BY id", PAGE_COLUMNS))?;
        let pages = stmt
            .query_map(params![project], page_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(pages)
    }

    // ===== Batch Management =====

    fn create_batch(
        &mut self,
        project: &str,
        page_ids: &[i64],
        config_hash: &str,
    ) -> StorageResult<(BatchRecord, Vec<RunRecord>)> {
        if page_ids.is_empty() {
            return Err(StorageError::ConstraintViolation(
                "a batch needs at least one page".to_string(),
            ));
        }

        let tx = self.conn.transaction()?;
        let created_at = now();

        for &page_id in page_ids {
            fetch_page(&tx, page_id)?;
        }

        tx.execute(
            "INSERT INTO batches (project, status, total_urls, config_hash, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                project,
                BatchStatus::Queued.to_db_string(),
                page_ids.len() as u32,
                config_hash,
                created_at
            ],
        )?;
        let batch_id = tx.last_insert_rowid();

        {
            let mut insert = tx.prepare(
                "INSERT INTO runs (page_id, batch_id, status, created_at) VALUES (?1, ?2, ?3, ?4)",
            )?;
            for &page_id in page_ids {
                insert.execute(params![
                    page_id,
                    batch_id,
                    RunStatus::Queued.to_db_string(),
                    created_at
                ])?;
            }
        }

        let batch = fetch_batch(&tx, batch_id)?;
        let runs = fetch_batch_runs(&tx, batch_id)?;
        tx.commit()?;

        Ok((batch, runs))
    }

    fn get_batch(&self, batch_id: i64) -> StorageResult<BatchRecord> {
        fetch_batch(&self.conn, batch_id)
    }

    fn list_batch_runs(&self, batch_id: i64) -> StorageResult<Vec<RunRecord>> {
        fetch_batch(&self.conn, batch_id)?;
        fetch_batch_runs(&self.conn, batch_id)
    }

    fn list_project_batches(&self, project: &str, limit: u32) -> StorageResult<Vec<BatchRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "{} WHERE project = ?1 ORDER BY created_at DESC, id DESC LIMIT ?2",
            BATCH_COLUMNS
        ))?;
        let batches = stmt
            .query_map(params![project, limit], batch_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(batches)
    }

    fn mark_batch_running(&mut self, batch_id: i64) -> StorageResult<()> {
        let updated = self.conn.execute(
            "UPDATE batches SET status = ?1 WHERE id = ?2 AND status = ?3",
            params![
                BatchStatus::Running.to_db_string(),
                batch_id,
                BatchStatus::Queued.to_db_string()
            ],
        )?;

        if updated == 0 {
            return Err(batch_update_error(&self.conn, batch_id, BatchStatus::Running));
        }
        Ok(())
    }

    fn increment_batch_completed(&mut self, batch_id: i64) -> StorageResult<()> {
        self.increment_batch_counter(batch_id, "completed")
    }

    fn increment_batch_failed(&mut self, batch_id: i64) -> StorageResult<()> {
        self.increment_batch_counter(batch_id, "failed")
    }

    fn complete_batch(&mut self, batch_id: i64) -> StorageResult<BatchRecord> {
        let updated = self.conn.execute(
            "UPDATE batches SET status = ?1, completed_at = ?2
             WHERE id = ?3 AND status = ?4 AND completed + failed = total_urls",
            params![
                BatchStatus::Completed.to_db_string(),
                now(),
                batch_id,
                BatchStatus::Running.to_db_string()
            ],
        )?;

        if updated == 0 {
            return Err(batch_update_error(&self.conn, batch_id, BatchStatus::Completed));
        }
        fetch_batch(&self.conn, batch_id)
    }

    // ===== Run Management =====

    fn create_run(&mut self, page_id: i64) -> StorageResult<RunRecord> {
        fetch_page(&self.conn, page_id)?;
        self.conn.execute(
            "INSERT INTO runs (page_id, status, created_at) VALUES (?1, ?2, ?3)",
            params![page_id, RunStatus::Queued.to_db_string(), now()],
        )?;
        fetch_run(&self.conn, self.conn.last_insert_rowid())
    }

    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord> {
        fetch_run(&self.conn, run_id)
    }

    fn mark_run_running(&mut self, run_id: i64) -> StorageResult<()> {
        let updated = self.conn.execute(
            "UPDATE runs SET status = ?1, started_at = ?2 WHERE id = ?3 AND status = ?4",
            params![
                RunStatus::Running.to_db_string(),
                now(),
                run_id,
                RunStatus::Queued.to_db_string()
            ],
        )?;

        if updated == 0 {
            return Err(run_transition_error(&self.conn, run_id, RunStatus::Running));
        }
        Ok(())
    }

    fn complete_run(&mut self, run_id: i64, completion: &RunCompletion) -> StorageResult<()> {
        let tx = self.conn.transaction()?;

        let updated = tx.execute(
            "UPDATE runs SET status = ?1, completed_at = ?2, http_status = ?3,
             response_time_ms = ?4, final_url = ?5, html_snapshot = ?6
             WHERE id = ?7 AND status = ?8",
            params![
                RunStatus::Completed.to_db_string(),
                now(),
                completion.http_status,
                completion.response_time_ms as i64,
                completion.final_url,
                completion.html_snapshot,
                run_id,
                RunStatus::Running.to_db_string()
            ],
        )?;

        if updated == 0 {
            // Dropping the transaction rolls it back
            return Err(run_transition_error(&tx, run_id, RunStatus::Completed));
        }

        {
            let mut insert = tx.prepare(
                "INSERT INTO run_checks
                 (run_id, position, check_id, category, status, severity, message, evidence, fix_hint)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            )?;
            for (position, check) in completion.checks.iter().enumerate() {
                let evidence = check
                    .evidence
                    .as_ref()
                    .map(serde_json::to_string)
                    .transpose()
                    .map_err(|e| StorageError::Serialization(e.to_string()))?;
                insert.execute(params![
                    run_id,
                    position as i64,
                    check.check_id,
                    check.category.as_str(),
                    check.status.to_db_string(),
                    check.severity.to_db_string(),
                    check.message,
                    evidence,
                    check.fix_hint
                ])?;
            }
        }

        let score = &completion.score;
        tx.execute(
            "INSERT INTO run_scores
             (run_id, overall, indexability, metadata, content, schema_score, variant_risk, ai_readiness)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                run_id,
                score.overall,
                score.indexability,
                score.metadata,
                score.content,
                score.schema,
                score.variant_risk,
                score.ai_readiness
            ],
        )?;

        tx.execute(
            "UPDATE pages SET latest_score = ?1
             WHERE id = (SELECT page_id FROM runs WHERE id = ?2)",
            params![score.overall, run_id],
        )?;

        tx.commit()?;
        Ok(())
    }

    fn fail_run(&mut self, run_id: i64, error_message: &str) -> StorageResult<()> {
        let updated = self.conn.execute(
            "UPDATE runs SET status = ?1, completed_at = ?2, error_message = ?3
             WHERE id = ?4 AND status IN (?5, ?6)",
            params![
                RunStatus::Failed.to_db_string(),
                now(),
                error_message,
                run_id,
                RunStatus::Queued.to_db_string(),
                RunStatus::Running.to_db_string()
            ],
        )?;

        if updated == 0 {
            return Err(run_transition_error(&self.conn, run_id, RunStatus::Failed));
        }
        Ok(())
    }

    fn get_run_checks(&self, run_id: i64) -> StorageResult<Vec<CheckResult>> {
        let mut stmt = self.conn.prepare(
            "SELECT check_id, category, status, severity, message, evidence, fix_hint
             FROM run_checks WHERE run_id = ?1 ORDER BY position",
        )?;

        let rows = stmt.query_map(params![run_id], |row| {
            let category: String = row.get(1)?;
            let status: String = row.get(2)?;
            let severity: String = row.get(3)?;
            Ok((
                row.get::<_, String>(0)?,
                Category::parse(&category).ok_or_else(|| invalid_column(1, "category", &category))?,
                CheckStatus::from_db_string(&status)
                    .ok_or_else(|| invalid_column(2, "check status", &status))?,
                Severity::from_db_string(&severity)
                    .ok_or_else(|| invalid_column(3, "severity", &severity))?,
                row.get::<_, String>(4)?,
                row.get::<_, Option<String>>(5)?,
                row.get::<_, Option<String>>(6)?,
            ))
        })?;

        let mut checks = Vec::new();
        for row in rows {
            let (check_id, category, status, severity, message, evidence, fix_hint) = row?;
            let evidence = evidence
                .map(|raw| serde_json::from_str::<Evidence>(&raw))
                .transpose()
                .map_err(|e| StorageError::Serialization(e.to_string()))?;
            checks.push(CheckResult {
                check_id,
                category,
                status,
                severity,
                message,
                evidence,
                fix_hint,
            });
        }

        Ok(checks)
    }

    fn get_run_score(&self, run_id: i64) -> StorageResult<Option<AuditScore>> {
        let score = self
            .conn
            .query_row(
                "SELECT overall, indexability, metadata, content, schema_score, variant_risk,
                 ai_readiness FROM run_scores WHERE run_id = ?1",
                params![run_id],
                |row| {
                    Ok(AuditScore {
                        overall: row.get(0)?,
                        indexability: row.get(1)?,
                        metadata: row.get(2)?,
                        content: row.get(3)?,
                        schema: row.get(4)?,
                        variant_risk: row.get(5)?,
                        ai_readiness: row.get(6)?,
                    })
                },
            )
            .optional()?;
        Ok(score)
    }

    fn get_run_snapshot(&self, run_id: i64) -> StorageResult<Option<String>> {
        let snapshot: Option<Option<String>> = self
            .conn
            .query_row(
                "SELECT html_snapshot FROM runs WHERE id = ?1",
                params![run_id],
                |row| row.get(0),
            )
            .optional()?;

        snapshot.ok_or(StorageError::RunNotFound(run_id))
    }

    fn list_page_runs(&self, page_id: i64, limit: u32) -> StorageResult<Vec<RunRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "{} WHERE r.page_id = ?1 ORDER BY r.created_at DESC, r.id DESC LIMIT ?2",
            RUN_COLUMNS
        ))?;
        let runs = stmt
            .query_map(params![page_id, limit], run_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(runs)
    }
}
