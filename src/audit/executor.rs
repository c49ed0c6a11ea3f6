//! Single-run pipeline
//!
//! A run goes QUEUED → RUNNING → {COMPLETED, FAILED}. The executor owns the
//! whole pipeline for one page: fetch, evaluate every check, score, and
//! persist. Whatever happens, a started run ends in a terminal state.

use crate::audit::context::AuditContext;
use crate::audit::engine::CheckEngine;
use crate::audit::fetcher::{FetchedPage, PageFetcher};
use crate::audit::score::AuditScore;
use crate::config::Config;
use crate::storage::{self, RunCompletion, SharedStorage, Storage, StorageError};

/// How a run ended
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    Completed { run_id: i64, score: AuditScore },
    Failed { run_id: i64, error: String },
}

impl RunOutcome {
    pub fn run_id(&self) -> i64 {
        match self {
            Self::Completed { run_id, .. } | Self::Failed { run_id, .. } => *run_id,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }
}

/// Executes audit runs against shared storage
pub struct RunExecutor<S: Storage> {
    fetcher: PageFetcher,
    engine: CheckEngine,
    storage: SharedStorage<S>,
    snapshot_limit: usize,
}

impl<S: Storage> RunExecutor<S> {
    pub fn new(
        fetcher: PageFetcher,
        engine: CheckEngine,
        storage: SharedStorage<S>,
        snapshot_limit: usize,
    ) -> Self {
        Self {
            fetcher,
            engine,
            storage,
            snapshot_limit,
        }
    }

    /// Builds an executor over the full catalogue from configuration
    pub fn from_config(config: &Config, storage: SharedStorage<S>) -> Result<Self, reqwest::Error> {
        Ok(Self::new(
            PageFetcher::new(&config.fetcher)?,
            CheckEngine::default(),
            storage,
            config.executor.snapshot_limit,
        ))
    }

    pub fn storage(&self) -> &SharedStorage<S> {
        &self.storage
    }

    /// Runs the full pipeline for one QUEUED run
    ///
    /// Fetch and completion failures are recorded on the run and reported as
    /// [`RunOutcome::Failed`]. An `Err` means the run could not be moved out
    /// of QUEUED or a failure could not be recorded.
    pub async fn execute(&self, run_id: i64, url: &str) -> Result<RunOutcome, StorageError> {
        storage::lock(&self.storage).mark_run_running(run_id)?;
        tracing::debug!("Run {} started for {}", run_id, url);

        let page = match self.fetcher.fetch(url).await {
            Ok(page) => page,
            Err(e) => return self.fail(run_id, e.to_string()),
        };

        let completion = self.evaluate(url, page);
        let score = completion.score;

        let stored = storage::lock(&self.storage).complete_run(run_id, &completion);
        match stored {
            Ok(()) => {
                tracing::info!("Run {} completed for {} (score {})", run_id, url, score.overall);
                Ok(RunOutcome::Completed { run_id, score })
            }
            Err(e) => {
                tracing::error!("Failed to store results for run {}: {}", run_id, e);
                self.fail(run_id, format!("Failed to store results: {}", e))
            }
        }
    }

    /// Parses the page, runs every check and scores the results
    ///
    /// Synchronous on purpose: the parsed document is not `Send`.
    fn evaluate(&self, url: &str, page: FetchedPage) -> RunCompletion {
        let http_status = page.status;
        let response_time_ms = page.latency_ms;
        let final_url = page.final_url.clone();
        let html_snapshot: String = page.body.chars().take(self.snapshot_limit).collect();

        let context = AuditContext::new(url, page);
        let checks = self.engine.run_all_checks(&context);
        let score = self.engine.calculate_score(&checks);

        RunCompletion {
            http_status,
            response_time_ms,
            final_url,
            html_snapshot,
            checks,
            score,
        }
    }

    fn fail(&self, run_id: i64, error: String) -> Result<RunOutcome, StorageError> {
        tracing::warn!("Run {} failed: {}", run_id, error);
        storage::lock(&self.storage).fail_run(run_id, &error)?;
        Ok(RunOutcome::Failed { run_id, error })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::fetcher::ResponseHeaders;
    use crate::config::FetcherConfig;
    use crate::state::RunStatus;
    use crate::storage::SqliteStorage;

    fn executor(snapshot_limit: usize) -> RunExecutor<SqliteStorage> {
        RunExecutor::new(
            PageFetcher::new(&FetcherConfig::default()).unwrap(),
            CheckEngine::default(),
            storage::shared(SqliteStorage::new_in_memory().unwrap()),
            snapshot_limit,
        )
    }

    fn page(body: &str) -> FetchedPage {
        FetchedPage {
            final_url: "https://a.com/p".to_string(),
            status: 200,
            latency_ms: 42,
            headers: ResponseHeaders::default(),
            body: body.to_string(),
        }
    }

    #[test]
    fn test_evaluate_truncates_snapshot_on_char_boundary() {
        let executor = executor(3);
        let completion = executor.evaluate("https://a.com/p", page("ééééé"));
        assert_eq!(completion.html_snapshot, "ééé");
        assert_eq!(completion.response_time_ms, 42);
        assert_eq!(completion.checks.len(), executor.engine.checks().len());
    }

    #[tokio::test]
    async fn test_invalid_url_fails_the_run() {
        let executor = executor(100);
        let run_id = {
            let mut storage = storage::lock(executor.storage());
            let (page_id, _) = storage.register_page("p", "not a url", "not a url").unwrap();
            storage.create_run(page_id).unwrap().id
        };

        let outcome = executor.execute(run_id, "not a url").await.unwrap();
        assert!(!outcome.is_completed());
        assert_eq!(outcome.run_id(), run_id);

        let run = storage::lock(executor.storage()).get_run(run_id).unwrap();
        assert_eq!(run.status, RunStatus::Failed);
        assert!(run.started_at.is_some());
        assert!(run.error_message.is_some());
    }

    #[tokio::test]
    async fn test_execute_refuses_non_queued_run() {
        let executor = executor(100);
        let run_id = {
            let mut storage = storage::lock(executor.storage());
            let (page_id, _) = storage.register_page("p", "x", "x").unwrap();
            let run_id = storage.create_run(page_id).unwrap().id;
            storage.fail_run(run_id, "cancelled").unwrap();
            run_id
        };

        let result = executor.execute(run_id, "https://a.com/p").await;
        assert!(matches!(result, Err(StorageError::InvalidTransition { .. })));
    }
}
