//! Per-page input shared by every check
//!
//! An `AuditContext` is built once per run from the fetched page and is
//! only ever handed out by shared reference. The parsed document is not
//! `Send`, so a context lives inside one synchronous evaluation step and
//! never crosses an await point.

use crate::audit::checks::CheckEvaluationError;
use crate::audit::fetcher::{FetchedPage, ResponseHeaders};
use scraper::{ElementRef, Html, Selector};

/// Immutable snapshot of one fetched page
pub struct AuditContext {
    url: String,
    http_status: u16,
    response_time_ms: u64,
    document: Html,
    headers: ResponseHeaders,
}

impl AuditContext {
    /// Builds a context for the page requested at `url`
    ///
    /// Checks are judged against the requested URL, not the final URL
    /// after redirects.
    pub fn new(url: &str, page: FetchedPage) -> Self {
        let document = Html::parse_document(&page.body);
        Self {
            url: url.to_string(),
            http_status: page.status,
            response_time_ms: page.latency_ms,
            document,
            headers: page.headers,
        }
    }

    /// Builds a context directly from markup, mostly useful in tests
    pub fn from_parts(
        url: &str,
        http_status: u16,
        response_time_ms: u64,
        html: &str,
        headers: ResponseHeaders,
    ) -> Self {
        Self {
            url: url.to_string(),
            http_status,
            response_time_ms,
            document: Html::parse_document(html),
            headers,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn http_status(&self) -> u16 {
        self.http_status
    }

    pub fn response_time_ms(&self) -> u64 {
        self.response_time_ms
    }

    pub fn headers(&self) -> &ResponseHeaders {
        &self.headers
    }

    /// All elements matching a CSS selector, in document order
    pub fn select(&self, css: &str) -> Result<Vec<ElementRef<'_>>, CheckEvaluationError> {
        let selector = parse_selector(css)?;
        Ok(self.document.select(&selector).collect())
    }

    /// Number of elements matching a CSS selector
    pub fn count(&self, css: &str) -> Result<usize, CheckEvaluationError> {
        let selector = parse_selector(css)?;
        Ok(self.document.select(&selector).count())
    }

    /// Attribute of the first element matching a CSS selector
    pub fn first_attr(&self, css: &str, attr: &str) -> Result<Option<String>, CheckEvaluationError> {
        let selector = parse_selector(css)?;
        Ok(self
            .document
            .select(&selector)
            .next()
            .and_then(|element| element.value().attr(attr))
            .map(str::to_string))
    }

    /// Concatenated text of every element matching a CSS selector
    pub fn text_of(&self, css: &str) -> Result<String, CheckEvaluationError> {
        let selector = parse_selector(css)?;
        Ok(self
            .document
            .select(&selector)
            .flat_map(|element| element.text())
            .collect())
    }
}

fn parse_selector(css: &str) -> Result<Selector, CheckEvaluationError> {
    Selector::parse(css)
        .map_err(|e| CheckEvaluationError::new(format!("invalid selector '{}': {}", css, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(html: &str) -> AuditContext {
        AuditContext::from_parts(
            "https://example.com/p",
            200,
            120,
            html,
            ResponseHeaders::default(),
        )
    }

    #[test]
    fn test_new_carries_transport_metadata() {
        let mut headers = ResponseHeaders::default();
        headers.insert("X-Robots-Tag", "noindex");
        let page = FetchedPage {
            final_url: "https://example.com/p/".to_string(),
            status: 301,
            latency_ms: 900,
            headers,
            body: "<title>T</title>".to_string(),
        };

        let ctx = AuditContext::new("https://example.com/p", page);
        assert_eq!(ctx.url(), "https://example.com/p");
        assert_eq!(ctx.http_status(), 301);
        assert_eq!(ctx.response_time_ms(), 900);
        assert_eq!(ctx.headers().get("x-robots-tag"), Some("noindex"));
        assert_eq!(ctx.text_of("title").unwrap(), "T");
    }

    #[test]
    fn test_select_and_count() {
        let ctx = context("<body><h1>A</h1><h1>B</h1><p>x</p></body>");
        assert_eq!(ctx.count("h1").unwrap(), 2);
        assert_eq!(ctx.select("p").unwrap().len(), 1);
    }

    #[test]
    fn test_first_attr_uses_first_match() {
        let ctx = context(
            r#"<head><meta name="description" content="one"><meta name="description" content="two"></head>"#,
        );
        assert_eq!(
            ctx.first_attr(r#"meta[name="description"]"#, "content").unwrap(),
            Some("one".to_string())
        );
        assert_eq!(ctx.first_attr("link", "href").unwrap(), None);
    }

    #[test]
    fn test_text_of_concatenates_matches() {
        let ctx = context("<body><span>a</span><span>b</span></body>");
        assert_eq!(ctx.text_of("span").unwrap(), "ab");
    }

    #[test]
    fn test_invalid_selector_is_an_error() {
        let ctx = context("<p></p>");
        assert!(ctx.count("p[").is_err());
    }
}
