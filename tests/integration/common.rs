//! Shared fixtures for integration tests

use page_audit::audit::{CheckEngine, PageFetcher, RunExecutor};
use page_audit::config::FetcherConfig;
use page_audit::storage::{self, SqliteStorage};
use page_audit::BatchCoordinator;
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Fetcher settings with short timeouts for local servers
pub fn test_fetcher_config() -> FetcherConfig {
    FetcherConfig {
        user_agent: "PageAuditTest/1.0".to_string(),
        timeout_secs: 5,
        connect_timeout_secs: 2,
        max_redirects: 5,
    }
}

/// Creates an executor over a fresh in-memory database
pub fn test_executor() -> Arc<RunExecutor<SqliteStorage>> {
    let fetcher = PageFetcher::new(&test_fetcher_config()).expect("Failed to build HTTP client");
    let storage = storage::shared(SqliteStorage::new_in_memory().expect("Failed to open database"));
    Arc::new(RunExecutor::new(fetcher, CheckEngine::default(), storage, 1_000))
}

/// Creates a coordinator with at most `max_concurrent_runs` runs in flight
pub fn test_coordinator(max_concurrent_runs: usize) -> BatchCoordinator<SqliteStorage> {
    BatchCoordinator::new(test_executor(), max_concurrent_runs, "test-hash")
}

/// Markup of a complete product page whose canonical points at `url`
pub fn product_page(url: &str) -> String {
    let copy = vec!["detail"; 320].join(" ");
    format!(
        r#"<html><head>
            <title>Acme Blue Widget - Durable Steel Construction</title>
            <meta name="description" content="{desc}">
            <link rel="canonical" href="{url}">
            <script type="application/ld+json">
            {{"@type": "Product", "name": "Widget",
              "offers": {{"price": "10.00", "availability": "InStock"}},
              "aggregateRating": {{"ratingValue": 5, "reviewCount": 3}}}}
            </script>
        </head><body>
            <h1>Blue Widget</h1>
            <img src="w.jpg" alt="Blue widget">
            <table><tr><td>Weight</td><td>2kg</td></tr></table>
            <div class="faq">Q and A</div>
            <p>{copy}</p>
        </body></html>"#,
        desc = "d".repeat(140),
        url = url,
        copy = copy,
    )
}

/// Serves `body` as HTML at `route`
pub async fn mount_page(server: &MockServer, route: &str, status: u16, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(status)
                .insert_header("content-type", "text/html; charset=utf-8")
                .set_body_bytes(body.into_bytes()),
        )
        .mount(server)
        .await;
}

/// An address nothing listens on
pub const UNREACHABLE_URL: &str = "http://127.0.0.1:1/product";
