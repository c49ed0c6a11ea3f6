//! PageFetcher against mock servers

use crate::common::{mount_page, test_fetcher_config, UNREACHABLE_URL};
use page_audit::audit::PageFetcher;
use page_audit::config::FetcherConfig;
use page_audit::FetchError;
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fetcher() -> PageFetcher {
    PageFetcher::new(&test_fetcher_config()).expect("Failed to build fetcher")
}

#[tokio::test]
async fn test_fetch_returns_body_status_and_headers() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/product", 200, "<html><title>T</title></html>".to_string()).await;

    let url = format!("{}/product", mock_server.uri());
    let page = fetcher().fetch(&url).await.expect("Fetch failed");

    assert_eq!(page.status, 200);
    assert_eq!(page.final_url, url);
    assert!(page.body.contains("<title>T</title>"));
    assert_eq!(
        page.headers.get("Content-Type"),
        Some("text/html; charset=utf-8")
    );
}

#[tokio::test]
async fn test_fetch_sends_configured_user_agent() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ua"))
        .and(header("user-agent", "PageAuditTest/1.0"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let page = fetcher()
        .fetch(&format!("{}/ua", mock_server.uri()))
        .await
        .expect("Fetch failed");
    assert_eq!(page.status, 200);
}

#[tokio::test]
async fn test_error_status_is_not_a_fetch_error() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/gone", 404, "missing".to_string()).await;

    let page = fetcher()
        .fetch(&format!("{}/gone", mock_server.uri()))
        .await
        .expect("HTTP errors are returned as pages");
    assert_eq!(page.status, 404);
    assert_eq!(page.body, "missing");
}

#[tokio::test]
async fn test_redirects_are_followed() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(
            ResponseTemplate::new(301).insert_header("location", "/new"),
        )
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, "/new", 200, "moved here".to_string()).await;

    let page = fetcher()
        .fetch(&format!("{}/old", mock_server.uri()))
        .await
        .expect("Fetch failed");
    assert_eq!(page.status, 200);
    assert_eq!(page.final_url, format!("{}/new", mock_server.uri()));
}

#[tokio::test]
async fn test_redirect_loop_hits_limit() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/loop"))
        .respond_with(
            ResponseTemplate::new(302).insert_header("location", "/loop"),
        )
        .mount(&mock_server)
        .await;

    let result = fetcher()
        .fetch(&format!("{}/loop", mock_server.uri()))
        .await;
    assert!(matches!(result, Err(FetchError::RedirectLimit { .. })));
}

#[tokio::test]
async fn test_slow_response_times_out() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("late")
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&mock_server)
        .await;

    let config = FetcherConfig {
        timeout_secs: 1,
        ..test_fetcher_config()
    };
    let fetcher = PageFetcher::new(&config).expect("Failed to build fetcher");

    let result = fetcher.fetch(&format!("{}/slow", mock_server.uri())).await;
    assert!(matches!(result, Err(FetchError::Timeout { .. })));
}

#[tokio::test]
async fn test_refused_connection() {
    let result = fetcher().fetch(UNREACHABLE_URL).await;
    assert!(matches!(result, Err(FetchError::Connect { .. })));
}
