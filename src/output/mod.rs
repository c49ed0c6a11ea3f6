//! Output module for presenting audit results
//!
//! This module handles:
//! - Deriving batch progress for status polling
//! - Assembling run detail, page history and project batch listings
//! - Rendering markdown run reports

mod markdown;
mod progress;
mod report;

pub use markdown::{format_run_report, write_run_report};
pub use progress::{
    batch_status, print_batch_status, BatchProgress, BatchRunStatus, BatchStatusReport,
};
pub use report::{page_history, project_batches, run_detail, RunDetail, DEFAULT_HISTORY_LIMIT};

use crate::storage::StorageError;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;
