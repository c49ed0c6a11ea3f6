//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::audit::{AuditScore, CheckResult};
use crate::state::{BatchStatus, RunStatus};
use crate::storage::{BatchRecord, PageRecord, RunCompletion, RunRecord};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Page not found: {0}")]
    PageNotFound(i64),

    #[error("Batch not found: {0}")]
    BatchNotFound(i64),

    #[error("Run not found: {0}")]
    RunNotFound(i64),

    #[error("Invalid run transition: {from} -> {to}")]
    InvalidTransition { from: RunStatus, to: RunStatus },

    #[error("Invalid batch transition: {from} -> {to}")]
    InvalidBatchTransition { from: BatchStatus, to: BatchStatus },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for storage backend implementations
///
/// This trait defines all database operations needed by the auditor.
/// Status changes are guarded: an update whose row is not in the expected
/// predecessor state fails with `InvalidTransition` and writes nothing.
pub trait Storage: Send {
    // ===== Page Registry =====

    /// Registers a page or returns the existing one
    ///
    /// # Returns
    ///
    /// `(page_id, created)` where `created` is false when the normalized URL
    /// was already registered for the project
    fn register_page(
        &mut self,
        project: &str,
        url: &str,
        normalized_url: &str,
    ) -> StorageResult<(i64, bool)>;

    /// Gets a page by ID
    fn get_page(&self, page_id: i64) -> StorageResult<PageRecord>;

    /// Gets all pages of a project, oldest first
    fn list_project_pages(&self, project: &str) -> StorageResult<Vec<PageRecord>>;

    // ===== Batch Management =====

    /// Creates a batch and one QUEUED run per page in a single transaction
    ///
    /// Fails without writing anything if any page does not exist.
    fn create_batch(
        &mut self,
        project: &str,
        page_ids: &[i64],
        config_hash: &str,
    ) -> StorageResult<(BatchRecord, Vec<RunRecord>)>;

    /// Gets a batch by ID
    fn get_batch(&self, batch_id: i64) -> StorageResult<BatchRecord>;

    /// Gets every run of a batch in creation order
    fn list_batch_runs(&self, batch_id: i64) -> StorageResult<Vec<RunRecord>>;

    /// Gets the most recent batches of a project, newest first
    fn list_project_batches(&self, project: &str, limit: u32) -> StorageResult<Vec<BatchRecord>>;

    /// Transitions a batch from QUEUED to RUNNING
    fn mark_batch_running(&mut self, batch_id: i64) -> StorageResult<()>;

    /// Atomically adds one to the batch's completed counter
    fn increment_batch_completed(&mut self, batch_id: i64) -> StorageResult<()>;

    /// Atomically adds one to the batch's failed counter
    fn increment_batch_failed(&mut self, batch_id: i64) -> StorageResult<()>;

    /// Transitions a batch from RUNNING to COMPLETED
    ///
    /// Refused unless every run has been counted.
    fn complete_batch(&mut self, batch_id: i64) -> StorageResult<BatchRecord>;

    // ===== Run Management =====

    /// Creates a standalone QUEUED run for a page
    fn create_run(&mut self, page_id: i64) -> StorageResult<RunRecord>;

    /// Gets a run by ID
    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord>;

    /// Transitions a run from QUEUED to RUNNING and stamps `started_at`
    fn mark_run_running(&mut self, run_id: i64) -> StorageResult<()>;

    /// Transitions a run from RUNNING to COMPLETED
    ///
    /// The run row, check rows, score row and the page's latest score are
    /// written in one transaction.
    fn complete_run(&mut self, run_id: i64, completion: &RunCompletion) -> StorageResult<()>;

    /// Transitions a run from QUEUED or RUNNING to FAILED
    fn fail_run(&mut self, run_id: i64, error_message: &str) -> StorageResult<()>;

    /// Gets the check results of a run in evaluation order
    fn get_run_checks(&self, run_id: i64) -> StorageResult<Vec<CheckResult>>;

    /// Gets the score of a run, if it completed
    fn get_run_score(&self, run_id: i64) -> StorageResult<Option<AuditScore>>;

    /// Gets the stored markup snapshot of a run, if it completed
    fn get_run_snapshot(&self, run_id: i64) -> StorageResult<Option<String>>;

    /// Gets the most recent runs of a page, newest first
    fn list_page_runs(&self, page_id: i64, limit: u32) -> StorageResult<Vec<RunRecord>>;
}
