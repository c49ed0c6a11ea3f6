//! URL inspections used by the canonical and clean-URL checks

use crate::url::normalize::strip_trailing_slash;
use crate::UrlError;
use url::Url;

/// Query parameter names that identify a server-side session
const SESSION_PARAMS: &[&str] = &["sid", "session", "phpsessid", "jsessionid"];

/// Checks whether a canonical href refers back to the page itself
///
/// The href is resolved against the page URL first, so relative canonicals
/// work. One trailing slash is ignored on both sides.
///
/// # Examples
///
/// ```
/// use page_audit::url::canonical_points_to;
///
/// assert!(canonical_points_to("https://example.com/lamp", "/lamp/").unwrap());
/// assert!(!canonical_points_to("https://example.com/lamp?c=red", "/lamp").unwrap());
/// ```
pub fn canonical_points_to(page_url: &str, canonical_href: &str) -> Result<bool, UrlError> {
    let base = Url::parse(page_url).map_err(|e| UrlError::Parse(e.to_string()))?;
    let resolved = base
        .join(canonical_href)
        .map_err(|e| UrlError::Parse(e.to_string()))?;

    Ok(strip_trailing_slash(resolved.as_str()) == strip_trailing_slash(page_url))
}

/// Returns true when the URL carries a non-empty query string
pub fn has_query(url: &Url) -> bool {
    url.query().map(|q| !q.is_empty()).unwrap_or(false)
}

/// Returns true when any query parameter name starts with a session marker
///
/// Matching is case-insensitive and prefix-based, so `PHPSESSID=..` and
/// `sid_token=..` both count.
pub fn has_session_param(url: &Url) -> bool {
    let Some(query) = url.query() else {
        return false;
    };

    query.split('&').any(|pair| {
        let pair = pair.to_ascii_lowercase();
        SESSION_PARAMS.iter().any(|name| pair.starts_with(name))
    })
}
