//! Does the page URL carry variant or session noise

use super::{CheckEvaluationError, CheckStatus, Finding};
use crate::audit::context::AuditContext;
use crate::url::{has_query, has_session_param};
use crate::UrlError;
use serde_json::json;
use url::Url;

/// Flags URLs that invite duplicate variants through query strings
pub(super) fn url_clean(ctx: &AuditContext) -> Result<Finding, CheckEvaluationError> {
    let url = Url::parse(ctx.url()).map_err(|e| UrlError::Parse(e.to_string()))?;
    let has_params = has_query(&url);
    let has_session_id = has_session_param(&url);

    let finding = if has_session_id {
        Finding::new(CheckStatus::Fail, "URL contains session parameters")
    } else if has_params {
        Finding::new(CheckStatus::Warn, "URL contains query parameters")
    } else {
        Finding::new(CheckStatus::Pass, "URL is clean")
    };

    let dirty = finding.status != CheckStatus::Pass;
    Ok(finding
        .with_evidence(json!({
            "url": ctx.url(),
            "hasParams": has_params,
            "hasSessionId": has_session_id,
        }))
        .with_fix_hint_if(
            dirty,
            "Use clean URLs without tracking or session parameters",
        ))
}
