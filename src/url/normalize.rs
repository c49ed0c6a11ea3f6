use crate::UrlError;
use url::Url;

/// Normalizes a page URL for de-duplication within a project
///
/// # Normalization Steps
///
/// 1. Parse the URL; reject if malformed
/// 2. Reject anything but HTTP and HTTPS
/// 3. Keep only scheme, host (with explicit port) and path
/// 4. Lowercase the whole result
/// 5. Remove all trailing slashes
///
/// Query strings and fragments are dropped, so two listings that differ
/// only by tracking parameters collapse onto the same page.
///
/// # Examples
///
/// ```
/// use page_audit::url::normalize_page_url;
///
/// let url = normalize_page_url("https://Shop.Example.com/Products/Lamp/?ref=home").unwrap();
/// assert_eq!(url, "https://shop.example.com/products/lamp");
/// ```
pub fn normalize_page_url(url_str: &str) -> Result<String, UrlError> {
    let url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    let host = url.host_str().ok_or(UrlError::MissingDomain)?;
    let authority = match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    };

    let normalized = format!("{}://{}{}", url.scheme(), authority, url.path()).to_lowercase();

    Ok(normalized.trim_end_matches('/').to_string())
}

/// Removes a single trailing slash, if present
pub fn strip_trailing_slash(url: &str) -> &str {
    url.strip_suffix('/').unwrap_or(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowercases_host_and_path() {
        let result = normalize_page_url("https://EXAMPLE.com/Page").unwrap();
        assert_eq!(result, "https://example.com/page");
    }

    #[test]
    fn test_drops_query_and_fragment() {
        let result = normalize_page_url("https://example.com/p?utm_source=x#reviews").unwrap();
        assert_eq!(result, "https://example.com/p");
    }

    #[test]
    fn test_removes_all_trailing_slashes() {
        assert_eq!(
            normalize_page_url("https://example.com/p///").unwrap(),
            "https://example.com/p"
        );
        assert_eq!(
            normalize_page_url("https://example.com/").unwrap(),
            "https://example.com"
        );
    }

    #[test]
    fn test_keeps_explicit_port() {
        let result = normalize_page_url("http://127.0.0.1:8080/item").unwrap();
        assert_eq!(result, "http://127.0.0.1:8080/item");
    }

    #[test]
    fn test_rejects_other_schemes() {
        assert!(matches!(
            normalize_page_url("ftp://example.com/file"),
            Err(UrlError::InvalidScheme(_))
        ));
        assert!(normalize_page_url("not a url").is_err());
    }

    #[test]
    fn test_strip_trailing_slash_removes_one() {
        assert_eq!(strip_trailing_slash("https://a.com/x/"), "https://a.com/x");
        assert_eq!(strip_trailing_slash("https://a.com/x//"), "https://a.com/x/");
        assert_eq!(strip_trailing_slash("https://a.com/x"), "https://a.com/x");
    }
}
