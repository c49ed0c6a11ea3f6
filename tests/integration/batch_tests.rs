//! BatchCoordinator lifecycle and concurrency

use crate::common::{mount_page, product_page, test_coordinator, UNREACHABLE_URL};
use page_audit::output::batch_status;
use page_audit::storage::{self, Storage};
use page_audit::{register_page, AuditError, BatchStatus, RunStatus};
use std::time::{Duration, Instant};
use wiremock::matchers::{method, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_batch_runs_every_page() {
    let mock_server = MockServer::start().await;
    let good = format!("{}/widget", mock_server.uri());
    mount_page(&mock_server, "/widget", 200, product_page(&good)).await;

    let coordinator = test_coordinator(2);
    let page_ids: Vec<i64> = {
        let mut storage = storage::lock(coordinator.storage());
        [good.as_str(), UNREACHABLE_URL]
            .iter()
            .map(|url| register_page(&mut *storage, "shop", url).unwrap().0)
            .collect()
    };

    let created = coordinator.create_batch("shop", &page_ids).unwrap();
    assert_eq!(created.batch.total_urls, 2);
    assert_eq!(created.batch.status, BatchStatus::Queued);
    assert_eq!(created.batch.config_hash, "test-hash");
    assert_eq!(created.runs.len(), 2);
    assert!(created.runs.iter().all(|r| r.status == RunStatus::Queued));
    assert!(created.runs.iter().all(|r| r.batch_id == Some(created.batch.id)));

    let batch = created.processing.await.unwrap().unwrap();
    assert_eq!(batch.status, BatchStatus::Completed);
    assert_eq!(batch.completed, 1);
    assert_eq!(batch.failed, 1);
    assert_eq!(batch.completed + batch.failed, batch.total_urls);
    assert!(batch.completed_at.is_some());

    let storage = storage::lock(coordinator.storage());
    let runs = storage.list_batch_runs(batch.id).unwrap();
    let statuses: Vec<_> = runs.iter().map(|r| r.status).collect();
    assert_eq!(statuses, [RunStatus::Completed, RunStatus::Failed]);

    let report = batch_status(&*storage, batch.id).unwrap();
    assert_eq!(report.progress.percent_complete, 100);
    assert_eq!(report.progress.remaining, 0);
    let scored: Vec<bool> = report.runs.iter().map(|r| r.score.is_some()).collect();
    assert_eq!(scored, [false, true]);
}

#[tokio::test]
async fn test_empty_batch_is_rejected_without_a_row() {
    let coordinator = test_coordinator(2);

    let result = coordinator.create_batch("shop", &[]);
    assert!(matches!(result, Err(AuditError::EmptyBatch)));

    let result = coordinator.create_project_batch("no-pages");
    assert!(matches!(result, Err(AuditError::EmptyBatch)));

    let storage = storage::lock(coordinator.storage());
    assert!(storage.list_project_batches("shop", 10).unwrap().is_empty());
    assert!(storage.list_project_batches("no-pages", 10).unwrap().is_empty());
}

#[tokio::test]
async fn test_project_batch_covers_registered_pages() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/p\d+$"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
        .mount(&mock_server)
        .await;

    let coordinator = test_coordinator(3);
    {
        let mut storage = storage::lock(coordinator.storage());
        for i in 0..4 {
            let url = format!("{}/p{}", mock_server.uri(), i);
            register_page(&mut *storage, "shop", &url).unwrap();
        }
        register_page(&mut *storage, "other", &format!("{}/p9", mock_server.uri())).unwrap();
    }

    let created = coordinator.create_project_batch("shop").unwrap();
    assert_eq!(created.batch.total_urls, 4);

    let batch = created.processing.await.unwrap().unwrap();
    assert_eq!(batch.completed, 4);
    assert_eq!(batch.failed, 0);
}

#[tokio::test]
async fn test_concurrency_is_bounded() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/slow\d+$"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html></html>")
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&mock_server)
        .await;

    let coordinator = test_coordinator(2);
    let page_ids: Vec<i64> = {
        let mut storage = storage::lock(coordinator.storage());
        (0..6)
            .map(|i| {
                let url = format!("{}/slow{}", mock_server.uri(), i);
                register_page(&mut *storage, "shop", &url).unwrap().0
            })
            .collect()
    };

    let start = Instant::now();
    let created = coordinator.create_batch("shop", &page_ids).unwrap();
    let batch = created.processing.await.unwrap().unwrap();
    let elapsed = start.elapsed();

    assert_eq!(batch.completed, 6);
    // Six 300ms requests, two at a time
    assert!(elapsed >= Duration::from_millis(850), "took {:?}", elapsed);
}

#[tokio::test]
async fn test_single_page_audit() {
    let mock_server = MockServer::start().await;
    let url = format!("{}/widget", mock_server.uri());
    mount_page(&mock_server, "/widget", 200, product_page(&url)).await;

    let coordinator = test_coordinator(1);
    let page_id = {
        let mut storage = storage::lock(coordinator.storage());
        register_page(&mut *storage, "shop", &url).unwrap().0
    };

    let created = coordinator.run_single_page_audit(page_id).unwrap();
    assert_eq!(created.run.status, RunStatus::Queued);
    assert_eq!(created.run.batch_id, None);

    let outcome = created.processing.await.unwrap().unwrap();
    assert!(outcome.is_completed());

    let storage = storage::lock(coordinator.storage());
    let run = storage.get_run(created.run.id).unwrap();
    assert_eq!(run.status, RunStatus::Completed);
    assert!(storage.get_run_score(run.id).unwrap().is_some());
}

#[tokio::test]
async fn test_single_page_audit_unknown_page() {
    let coordinator = test_coordinator(1);
    assert!(matches!(
        coordinator.run_single_page_audit(404),
        Err(AuditError::Storage(_))
    ));
}
