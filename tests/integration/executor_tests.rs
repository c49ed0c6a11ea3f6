//! RunExecutor end-to-end: fetch, evaluate, store

use crate::common::{mount_page, product_page, test_executor, UNREACHABLE_URL};
use page_audit::audit::{CheckStatus, RunOutcome, CATALOGUE};
use page_audit::storage::{self, Storage};
use page_audit::{register_page, RunStatus};
use wiremock::MockServer;

#[tokio::test]
async fn test_execute_completes_run_with_all_checks() {
    let mock_server = MockServer::start().await;
    let url = format!("{}/widget", mock_server.uri());
    mount_page(&mock_server, "/widget", 200, product_page(&url)).await;

    let executor = test_executor();
    let run_id = {
        let mut storage = storage::lock(executor.storage());
        let (page_id, _) = register_page(&mut *storage, "shop", &url).unwrap();
        storage.create_run(page_id).unwrap().id
    };

    let outcome = executor.execute(run_id, &url).await.unwrap();
    let score = match outcome {
        RunOutcome::Completed { score, .. } => score,
        RunOutcome::Failed { error, .. } => panic!("run failed: {}", error),
    };

    let storage = storage::lock(executor.storage());
    let run = storage.get_run(run_id).unwrap();
    assert_eq!(run.status, RunStatus::Completed);
    assert_eq!(run.http_status, Some(200));
    assert!(run.started_at.is_some());
    assert!(run.completed_at.is_some());
    assert!(run.error_message.is_none());

    let checks = storage.get_run_checks(run_id).unwrap();
    assert_eq!(checks.len(), CATALOGUE.len());
    assert!(checks
        .iter()
        .filter(|c| c.check_id != "response_time")
        .all(|c| c.status == CheckStatus::Pass));

    assert_eq!(storage.get_run_score(run_id).unwrap(), Some(score));
    let page = storage.get_page(run.page_id).unwrap();
    assert_eq!(page.latest_score, Some(score.overall));

    // Snapshot is capped by the executor's limit
    let snapshot = storage.get_run_snapshot(run_id).unwrap().unwrap();
    assert_eq!(snapshot.chars().count(), 1_000);
}

#[tokio::test]
async fn test_error_status_still_completes() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/gone", 404, "<html></html>".to_string()).await;
    let url = format!("{}/gone", mock_server.uri());

    let executor = test_executor();
    let run_id = {
        let mut storage = storage::lock(executor.storage());
        let (page_id, _) = register_page(&mut *storage, "shop", &url).unwrap();
        storage.create_run(page_id).unwrap().id
    };

    let outcome = executor.execute(run_id, &url).await.unwrap();
    assert!(outcome.is_completed());

    let storage = storage::lock(executor.storage());
    let checks = storage.get_run_checks(run_id).unwrap();
    let status_check = checks
        .iter()
        .find(|c| c.check_id == "http_status_ok")
        .unwrap();
    assert_eq!(status_check.status, CheckStatus::Fail);
    assert_eq!(storage.get_run(run_id).unwrap().http_status, Some(404));
}

#[tokio::test]
async fn test_unreachable_page_fails_run_without_score() {
    let executor = test_executor();
    let run_id = {
        let mut storage = storage::lock(executor.storage());
        let (page_id, _) = register_page(&mut *storage, "shop", UNREACHABLE_URL).unwrap();
        storage.create_run(page_id).unwrap().id
    };

    let outcome = executor.execute(run_id, UNREACHABLE_URL).await.unwrap();
    match &outcome {
        RunOutcome::Failed { error, .. } => assert!(!error.is_empty()),
        RunOutcome::Completed { .. } => panic!("unreachable page completed"),
    }

    let storage = storage::lock(executor.storage());
    let run = storage.get_run(run_id).unwrap();
    assert_eq!(run.status, RunStatus::Failed);
    assert!(run.started_at.is_some());
    assert!(run.error_message.as_deref().is_some_and(|e| !e.is_empty()));
    assert!(storage.get_run_checks(run_id).unwrap().is_empty());
    assert_eq!(storage.get_run_score(run_id).unwrap(), None);
}
