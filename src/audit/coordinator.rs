//! Batch coordinator - creates batches and drives their runs
//!
//! This module owns the batch lifecycle:
//! - Creating a batch and its QUEUED runs in one storage transaction
//! - Dispatching runs to the executor under a concurrency limit
//! - Counting every terminated run exactly once
//! - Marking the batch COMPLETED once all runs are counted
//!
//! Creation returns immediately; processing continues on a background task
//! whose handle is returned to the caller.

use crate::audit::executor::{RunExecutor, RunOutcome};
use crate::config::Config;
use crate::storage::{
    self, BatchRecord, RunRecord, SharedStorage, Storage, StorageError, StorageResult,
};
use crate::state::RunStatus;
use crate::AuditError;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinHandle};

/// A newly created batch and its background processing
#[derive(Debug)]
pub struct CreatedBatch {
    pub batch: BatchRecord,
    pub runs: Vec<RunRecord>,
    /// Resolves to the COMPLETED batch
    pub processing: JoinHandle<Result<BatchRecord, AuditError>>,
}

/// A newly created standalone run and its background execution
#[derive(Debug)]
pub struct CreatedRun {
    pub run: RunRecord,
    pub processing: JoinHandle<Result<RunOutcome, AuditError>>,
}

/// Creates batches and processes them with bounded concurrency
pub struct BatchCoordinator<S: Storage + 'static> {
    storage: SharedStorage<S>,
    executor: Arc<RunExecutor<S>>,
    semaphore: Arc<Semaphore>,
    config_hash: String,
}

impl<S: Storage + 'static> Clone for BatchCoordinator<S> {
    fn clone(&self) -> Self {
        Self {
            storage: Arc::clone(&self.storage),
            executor: Arc::clone(&self.executor),
            semaphore: Arc::clone(&self.semaphore),
            config_hash: self.config_hash.clone(),
        }
    }
}

impl<S: Storage + 'static> BatchCoordinator<S> {
    /// Creates a coordinator around an existing executor
    ///
    /// # Arguments
    ///
    /// * `executor` - Executor whose storage is shared with the coordinator
    /// * `max_concurrent_runs` - Upper bound on runs executing at once
    /// * `config_hash` - Recorded on every batch this coordinator creates
    pub fn new(executor: Arc<RunExecutor<S>>, max_concurrent_runs: usize, config_hash: &str) -> Self {
        Self {
            storage: Arc::clone(executor.storage()),
            executor,
            semaphore: Arc::new(Semaphore::new(max_concurrent_runs.max(1))),
            config_hash: config_hash.to_string(),
        }
    }

    /// Builds an executor and coordinator from configuration
    pub fn from_config(config: &Config, config_hash: &str, storage: S) -> Result<Self, AuditError> {
        let executor = RunExecutor::from_config(config, storage::shared(storage))?;
        Ok(Self::new(
            Arc::new(executor),
            config.executor.max_concurrent_runs as usize,
            config_hash,
        ))
    }

    pub fn storage(&self) -> &SharedStorage<S> {
        &self.storage
    }

    /// Creates a batch over `page_ids` and starts processing it
    ///
    /// # Errors
    ///
    /// * `EmptyBatch` - no pages were given; nothing is written
    /// * `Storage` - a page does not exist or the transaction failed
    pub fn create_batch(&self, project: &str, page_ids: &[i64]) -> Result<CreatedBatch, AuditError> {
        if page_ids.is_empty() {
            return Err(AuditError::EmptyBatch);
        }

        let (batch, runs) =
            storage::lock(&self.storage).create_batch(project, page_ids, &self.config_hash)?;

        tracing::info!(
            "Created batch {} for project '{}' with {} runs",
            batch.id,
            project,
            runs.len()
        );

        let coordinator = self.clone();
        let batch_id = batch.id;
        let processing = tokio::spawn(async move { coordinator.process_batch(batch_id).await });

        Ok(CreatedBatch {
            batch,
            runs,
            processing,
        })
    }

    /// Creates a batch over every registered page of a project
    pub fn create_project_batch(&self, project: &str) -> Result<CreatedBatch, AuditError> {
        let page_ids: Vec<i64> = storage::lock(&self.storage)
            .list_project_pages(project)?
            .into_iter()
            .map(|page| page.id)
            .collect();

        self.create_batch(project, &page_ids)
    }

    /// Creates a standalone run for one page and starts executing it
    pub fn run_single_page_audit(&self, page_id: i64) -> Result<CreatedRun, AuditError> {
        let run = storage::lock(&self.storage).create_run(page_id)?;
        tracing::info!("Created run {} for {}", run.id, run.url);

        let executor = Arc::clone(&self.executor);
        let semaphore = Arc::clone(&self.semaphore);
        let run_id = run.id;
        let url = run.url.clone();

        let processing = tokio::spawn(async move {
            let permit = semaphore
                .acquire_owned()
                .await
                .map_err(|e| AuditError::Task(e.to_string()))?;

            let task_executor = Arc::clone(&executor);
            let execution = tokio::spawn(async move {
                let _permit = permit;
                task_executor.execute(run_id, &url).await
            });

            match execution.await {
                Ok(outcome) => outcome.map_err(AuditError::from),
                Err(e) => Err(recover_panicked_run(executor.storage(), run_id, e)),
            }
        });

        Ok(CreatedRun { run, processing })
    }

    /// Runs every QUEUED run of a batch, then completes the batch
    ///
    /// Runs that are no longer QUEUED when processing starts are counted by
    /// their current status instead of being executed. Once every task has
    /// finished, counts that could not be recorded are settled from the
    /// runs' stored statuses, so the batch always reaches COMPLETED.
    async fn process_batch(self, batch_id: i64) -> Result<BatchRecord, AuditError> {
        let runs = {
            let mut storage = storage::lock(&self.storage);
            storage.mark_batch_running(batch_id)?;
            storage.list_batch_runs(batch_id)?
        };

        tracing::info!("Processing batch {} ({} runs)", batch_id, runs.len());

        let mut handles = Vec::with_capacity(runs.len());

        for run in runs {
            if run.status != RunStatus::Queued {
                count_undispatched_run(&self.storage, batch_id, &run);
                continue;
            }

            let permit = Arc::clone(&self.semaphore)
                .acquire_owned()
                .await
                .map_err(|e| AuditError::Task(e.to_string()))?;

            let executor = Arc::clone(&self.executor);
            let run_id = run.id;

            let handle = tokio::spawn(async move {
                let _permit = permit;
                let outcome = executor.execute(run.id, &run.url).await;
                record_outcome(executor.storage(), batch_id, run.id, outcome)
            });

            handles.push((run_id, handle));
        }

        for (run_id, handle) in handles {
            match handle.await {
                Ok(Ok(outcome)) => {
                    tracing::debug!(
                        "Batch {} run {} finished (completed: {})",
                        batch_id,
                        run_id,
                        outcome.is_completed()
                    );
                }
                Ok(Err(e)) => {
                    tracing::error!("Batch {} run {} could not be recorded: {}", batch_id, run_id, e);
                }
                Err(e) => {
                    recover_panicked_run(&self.storage, run_id, e);
                    let counted = storage::lock(&self.storage).increment_batch_failed(batch_id);
                    if let Err(e) = counted {
                        tracing::error!("Failed to count run {} in batch {}: {}", run_id, batch_id, e);
                    }
                }
            }
        }

        let batch = {
            let mut storage = storage::lock(&self.storage);
            settle_batch_counters(&mut *storage, batch_id)?;
            storage.complete_batch(batch_id)?
        };
        tracing::info!(
            "Batch {} completed: {} completed, {} failed",
            batch.id,
            batch.completed,
            batch.failed
        );
        Ok(batch)
    }
}

/// Counts a run that was already past QUEUED when its batch started
///
/// A COMPLETED or FAILED run is counted by its status. A RUNNING run has no
/// task left to finish it, so it is failed first.
fn count_undispatched_run<S: Storage>(storage: &SharedStorage<S>, batch_id: i64, run: &RunRecord) {
    let mut storage = storage::lock(storage);
    let counted = match run.status {
        RunStatus::Completed => storage.increment_batch_completed(batch_id),
        RunStatus::Failed => storage.increment_batch_failed(batch_id),
        RunStatus::Running | RunStatus::Queued => {
            if let Err(e) = storage.fail_run(run.id, "Run was not queued when its batch started") {
                tracing::warn!("Run {} left as is: {}", run.id, e);
            }
            storage.increment_batch_failed(batch_id)
        }
    };

    match counted {
        Ok(()) => tracing::debug!(
            "Batch {} run {} counted without dispatch ({})",
            batch_id,
            run.id,
            run.status
        ),
        Err(e) => tracing::error!("Failed to count run {} in batch {}: {}", run.id, batch_id, e),
    }
}

/// Fills counts missing from a batch whose tasks have all finished
///
/// Runs still not terminal are failed. The missing counts then go to
/// `completed` up to the number of COMPLETED runs not yet counted, and the
/// rest to `failed`. Never raises `completed + failed` above `total_urls`.
fn settle_batch_counters<S: Storage + ?Sized>(storage: &mut S, batch_id: i64) -> StorageResult<()> {
    let batch = storage.get_batch(batch_id)?;
    let missing = batch.total_urls.saturating_sub(batch.finished());
    if missing == 0 {
        return Ok(());
    }

    tracing::warn!(
        "Batch {} has {} uncounted runs; settling from run statuses",
        batch_id,
        missing
    );

    let runs = storage.list_batch_runs(batch_id)?;
    for run in runs.iter().filter(|r| !r.status.is_terminal()) {
        if let Err(e) = storage.fail_run(run.id, "Run did not finish before its batch") {
            tracing::warn!("Run {} left as is: {}", run.id, e);
        }
    }

    let completed_runs = runs
        .iter()
        .filter(|r| r.status == RunStatus::Completed)
        .count() as u32;
    let completed_gap = completed_runs.saturating_sub(batch.completed).min(missing);

    for _ in 0..completed_gap {
        storage.increment_batch_completed(batch_id)?;
    }
    for _ in completed_gap..missing {
        storage.increment_batch_failed(batch_id)?;
    }

    Ok(())
}

/// Counts a terminated run against its batch
///
/// A run the executor could not drive to a terminal state is failed here
/// when possible and always counted as failed, so the batch can finish.
fn record_outcome<S: Storage>(
    storage: &SharedStorage<S>,
    batch_id: i64,
    run_id: i64,
    outcome: Result<RunOutcome, StorageError>,
) -> Result<RunOutcome, AuditError> {
    let mut storage = storage::lock(storage);
    match outcome {
        Ok(outcome) => {
            if outcome.is_completed() {
                storage.increment_batch_completed(batch_id)?;
            } else {
                storage.increment_batch_failed(batch_id)?;
            }
            Ok(outcome)
        }
        Err(e) => {
            tracing::error!("Run {} could not be executed: {}", run_id, e);
            if let Err(fail_err) = storage.fail_run(run_id, &e.to_string()) {
                tracing::warn!("Run {} left as is: {}", run_id, fail_err);
            }
            storage.increment_batch_failed(batch_id)?;
            Err(e.into())
        }
    }
}

/// Marks a run whose task panicked as FAILED
fn recover_panicked_run<S: Storage>(
    storage: &SharedStorage<S>,
    run_id: i64,
    err: JoinError,
) -> AuditError {
    let message = format!("Audit task panicked: {}", err);
    tracing::error!("Run {}: {}", run_id, message);

    if let Err(e) = storage::lock(storage).fail_run(run_id, &message) {
        tracing::error!("Failed to mark run {} as failed: {}", run_id, e);
    }

    AuditError::Task(message)
}
