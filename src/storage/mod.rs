//! Storage module for persisting audit data
//!
//! This module handles all database operations for the auditor, including:
//! - SQLite database initialization and schema management
//! - Page registration per project
//! - Batch and run lifecycle with guarded status transitions
//! - Check results, scores and markup snapshots for completed runs

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStorage;
pub use traits::{Storage, StorageError, StorageResult};

use crate::audit::{AuditScore, CheckResult};
use crate::state::{BatchStatus, RunStatus};

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

/// Storage handle shared between the coordinator and in-flight runs
pub type SharedStorage<S> = Arc<Mutex<S>>;

/// Initializes or opens a storage database
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file
///
/// # Returns
///
/// * `Ok(SqliteStorage)` - Successfully initialized storage
/// * `Err(StorageError)` - Failed to initialize storage
pub fn open_storage(path: &Path) -> StorageResult<SqliteStorage> {
    SqliteStorage::new(path)
}

/// Wraps a backend for sharing across tasks
pub fn shared<S: Storage>(storage: S) -> SharedStorage<S> {
    Arc::new(Mutex::new(storage))
}

/// Locks shared storage
///
/// A task that panicked while holding the lock poisons it. The poison is
/// cleared and the guard returned: storage calls either commit or roll back
/// their transaction on unwind, so the backend stays consistent and the
/// remaining runs can still record their outcome.
pub fn lock<S: Storage>(storage: &SharedStorage<S>) -> MutexGuard<'_, S> {
    storage.lock().unwrap_or_else(|poisoned| {
        tracing::warn!("Storage lock was poisoned by a panicking task; recovering");
        storage.clear_poison();
        poisoned.into_inner()
    })
}

/// Represents a registered page
#[derive(Debug, Clone, PartialEq)]
pub struct PageRecord {
    pub id: i64,
    pub project: String,
    pub url: String,
    pub normalized_url: String,
    pub latest_score: Option<u32>,
    pub created_at: String,
}

/// Represents a batch of runs created together
#[derive(Debug, Clone, PartialEq)]
pub struct BatchRecord {
    pub id: i64,
    pub project: String,
    pub status: BatchStatus,
    pub total_urls: u32,
    pub completed: u32,
    pub failed: u32,
    pub config_hash: String,
    pub created_at: String,
    pub completed_at: Option<String>,
}

impl BatchRecord {
    /// Runs that have reached a terminal state
    pub fn finished(&self) -> u32 {
        self.completed + self.failed
    }
}

/// Represents one audit of one page
#[derive(Debug, Clone, PartialEq)]
pub struct RunRecord {
    pub id: i64,
    pub page_id: i64,
    pub batch_id: Option<i64>,
    /// URL of the audited page
    pub url: String,
    pub status: RunStatus,
    pub created_at: String,
    pub started_at: Option<String>,
    pub completed_at: Option<String>,
    pub http_status: Option<u16>,
    pub response_time_ms: Option<u64>,
    pub final_url: Option<String>,
    pub error_message: Option<String>,
}

/// Everything written when a run completes
#[derive(Debug, Clone)]
pub struct RunCompletion {
    pub http_status: u16,
    pub response_time_ms: u64,
    pub final_url: String,
    pub html_snapshot: String,
    pub checks: Vec<CheckResult>,
    pub score: AuditScore,
}
