//! Batch progress derivation

use crate::audit::AuditScore;
use crate::output::OutputResult;
use crate::storage::{BatchRecord, RunRecord, Storage};

/// Aggregate progress of a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchProgress {
    pub total: u32,
    pub completed: u32,
    pub failed: u32,
    pub remaining: u32,
    /// Share of runs in a terminal state, 0 to 100
    pub percent_complete: u32,
}

impl BatchProgress {
    pub fn from_batch(batch: &BatchRecord) -> Self {
        let total = batch.total_urls;
        let finished = batch.finished();
        let percent_complete = if total == 0 {
            0
        } else {
            (f64::from(finished) / f64::from(total) * 100.0).round() as u32
        };

        Self {
            total,
            completed: batch.completed,
            failed: batch.failed,
            remaining: total.saturating_sub(finished),
            percent_complete,
        }
    }
}

/// One run of a batch with its score, once it has one
#[derive(Debug, Clone, PartialEq)]
pub struct BatchRunStatus {
    pub run: RunRecord,
    pub score: Option<AuditScore>,
}

/// A batch together with its derived progress and runs
#[derive(Debug, Clone, PartialEq)]
pub struct BatchStatusReport {
    pub batch: BatchRecord,
    pub progress: BatchProgress,
    /// Newest first
    pub runs: Vec<BatchRunStatus>,
}

/// Loads a batch, its runs and scores, and derives its progress
pub fn batch_status(storage: &dyn Storage, batch_id: i64) -> OutputResult<BatchStatusReport> {
    let batch = storage.get_batch(batch_id)?;
    let progress = BatchProgress::from_batch(&batch);

    let mut runs = Vec::new();
    for run in storage.list_batch_runs(batch_id)?.into_iter().rev() {
        let score = storage.get_run_score(run.id)?;
        runs.push(BatchRunStatus { run, score });
    }

    Ok(BatchStatusReport {
        batch,
        progress,
        runs,
    })
}

/// Prints batch progress to stdout in a formatted manner
pub fn print_batch_status(report: &BatchStatusReport) {
    let batch = &report.batch;
    let progress = &report.progress;

    println!("=== Batch {} ===\n", batch.id);
    println!("  Project: {}", batch.project);
    println!("  Status: {}", batch.status);
    println!("  Created: {}", batch.created_at);
    if let Some(completed_at) = &batch.completed_at {
        println!("  Completed: {}", completed_at);
    }
    println!();

    println!("Progress:");
    println!("  Total: {}", progress.total);
    println!("  Completed: {}", progress.completed);
    println!("  Failed: {}", progress.failed);
    println!("  Remaining: {}", progress.remaining);
    println!("  {}% done", progress.percent_complete);

    if report.runs.is_empty() {
        return;
    }

    println!("\nRuns:");
    for entry in &report.runs {
        let score = entry
            .score
            .map(|s| s.overall.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  Run {:>5}  {:<9}  score {:>3}  {}",
            entry.run.id,
            entry.run.status.to_string(),
            score,
            entry.run.url
        );
        if let Some(error) = &entry.run.error_message {
            println!("    Error: {}", error);
        }
    }
}
