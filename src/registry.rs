//! Page registry
//!
//! Pages are registered per project and deduplicated on their normalized
//! URL. The URL as given is kept for fetching.

use crate::storage::Storage;
use crate::url::normalize_page_url;
use crate::AuditError;

/// Outcome of a bulk import
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
    /// Pages newly registered
    pub created: usize,
    /// URLs already registered for the project
    pub skipped: usize,
    /// One `"<url>: <reason>"` entry per rejected URL
    pub errors: Vec<String>,
}

/// Registers one page, returning its ID and whether it was newly created
pub fn register_page<S: Storage + ?Sized>(
    storage: &mut S,
    project: &str,
    url: &str,
) -> Result<(i64, bool), AuditError> {
    let normalized = normalize_page_url(url)?;
    let (page_id, created) = storage.register_page(project, url, &normalized)?;
    if created {
        tracing::debug!("Registered page {} ({}) in '{}'", page_id, normalized, project);
    }
    Ok((page_id, created))
}

/// Registers many pages, continuing past invalid URLs
///
/// Blank lines are ignored. A storage failure on one URL is reported in
/// `errors` like an invalid URL.
pub fn import_pages<S, I>(storage: &mut S, project: &str, urls: I) -> ImportSummary
where
    S: Storage + ?Sized,
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut summary = ImportSummary::default();

    for url in urls {
        let url = url.as_ref().trim();
        if url.is_empty() {
            continue;
        }

        match register_page(storage, project, url) {
            Ok((_, true)) => summary.created += 1,
            Ok((_, false)) => summary.skipped += 1,
            Err(e) => {
                tracing::warn!("Skipping {}: {}", url, e);
                summary.errors.push(format!("{}: {}", url, e));
            }
        }
    }

    tracing::info!(
        "Imported into '{}': {} created, {} skipped, {} errors",
        project,
        summary.created,
        summary.skipped,
        summary.errors.len()
    );

    summary
}
