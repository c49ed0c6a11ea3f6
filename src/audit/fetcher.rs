//! HTTP fetcher implementation
//!
//! This module retrieves one page per call:
//! - Builds the HTTP client with the identifying user agent
//! - Follows redirects up to the configured limit
//! - Measures wall-clock latency from request start to full body
//! - Classifies transport failures into `FetchError`
//!
//! Non-2xx responses are returned like any other page; judging the status
//! code is the job of the check catalogue. There is no retry here.

use crate::config::FetcherConfig;
use crate::FetchError;
use reqwest::header::HeaderMap;
use reqwest::{redirect::Policy, Client};
use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use url::Url;

/// Response headers with case-insensitive lookup
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseHeaders {
    entries: BTreeMap<String, String>,
}

impl ResponseHeaders {
    /// Inserts a header, replacing any value under the same name
    pub fn insert(&mut self, name: &str, value: &str) {
        self.entries
            .insert(name.to_ascii_lowercase(), value.to_string());
    }

    /// Looks up a header by name, ignoring case
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<&HeaderMap> for ResponseHeaders {
    fn from(map: &HeaderMap) -> Self {
        let mut headers = ResponseHeaders::default();
        for (name, value) in map {
            // Non-visible-ASCII values are kept lossily rather than dropped
            let value = String::from_utf8_lossy(value.as_bytes());
            headers.insert(name.as_str(), &value);
        }
        headers
    }
}

/// A successfully retrieved page
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Final URL after redirects
    pub final_url: String,
    /// HTTP status code of the final response
    pub status: u16,
    /// Milliseconds from request start until the body was fully read
    pub latency_ms: u64,
    /// Response headers of the final response
    pub headers: ResponseHeaders,
    /// Decoded page body
    pub body: String,
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use page_audit::audit::build_http_client;
/// use page_audit::config::FetcherConfig;
///
/// let client = build_http_client(&FetcherConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &FetcherConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .redirect(Policy::limited(config.max_redirects))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Retrieves page markup and transport metadata
#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: Client,
}

impl PageFetcher {
    /// Creates a fetcher with a client built from configuration
    pub fn new(config: &FetcherConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(config)?,
        })
    }

    /// Fetches a URL with a single GET request
    ///
    /// # Error Classification
    ///
    /// | Condition | Error |
    /// |-----------|-------|
    /// | Unparseable or non-HTTP URL | `InvalidUrl` |
    /// | Timeout (headers or body) | `Timeout` |
    /// | Connection refused / DNS / TLS | `Connect` |
    /// | Redirect chain over the limit | `RedirectLimit` |
    /// | Body not decodable | `Body` |
    /// | Anything else | `Request` |
    pub async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let parsed = Url::parse(url).map_err(|e| FetchError::InvalidUrl {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(FetchError::InvalidUrl {
                url: url.to_string(),
                message: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }

        let start = Instant::now();

        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|e| classify_error(url, e))?;

        let status = response.status().as_u16();
        let final_url = response.url().to_string();
        let headers = ResponseHeaders::from(response.headers());

        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout {
                    url: url.to_string(),
                }
            } else {
                FetchError::Body {
                    url: url.to_string(),
                    source: e,
                }
            }
        })?;

        let latency_ms = start.elapsed().as_millis() as u64;

        tracing::debug!(
            "Fetched {} -> {} (HTTP {}, {} bytes, {}ms)",
            url,
            final_url,
            status,
            body.len(),
            latency_ms
        );

        Ok(FetchedPage {
            final_url,
            status,
            latency_ms,
            headers,
            body,
        })
    }
}

/// Maps a request-phase reqwest error onto a fetch error
fn classify_error(url: &str, e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else if e.is_redirect() {
        FetchError::RedirectLimit {
            url: url.to_string(),
        }
    } else if e.is_connect() {
        FetchError::Connect {
            url: url.to_string(),
            source: e,
        }
    } else {
        FetchError::Request {
            url: url.to_string(),
            source: e,
        }
    }
}
