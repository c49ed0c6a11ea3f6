//! Can search engines reach and index the page

use super::{CheckEvaluationError, CheckStatus, Finding};
use crate::audit::context::AuditContext;
use crate::url::canonical_points_to;
use serde_json::json;

/// Latency above which the page is considered slow
const SLOW_RESPONSE_MS: u64 = 1500;

/// Latency above which the page is considered very slow
const VERY_SLOW_RESPONSE_MS: u64 = 3000;

pub(super) fn http_status_ok(ctx: &AuditContext) -> Result<Finding, CheckEvaluationError> {
    let status = ctx.http_status();
    let ok = status == 200;

    let finding = if ok {
        Finding::new(CheckStatus::Pass, "Page returns HTTP 200")
    } else {
        Finding::new(CheckStatus::Fail, format!("Page returns HTTP {}", status))
    };

    Ok(finding
        .with_evidence(json!({ "httpStatus": status }))
        .with_fix_hint_if(!ok, "Ensure the page returns a 200 status code"))
}

pub(super) fn no_noindex(ctx: &AuditContext) -> Result<Finding, CheckEvaluationError> {
    let robots_meta = ctx
        .first_attr(r#"meta[name="robots"]"#, "content")?
        .unwrap_or_default();
    let noindex = robots_meta.to_lowercase().contains("noindex");

    let finding = if noindex {
        Finding::new(CheckStatus::Fail, "Page has noindex directive")
    } else {
        Finding::new(CheckStatus::Pass, "Page is indexable")
    };

    Ok(finding
        .with_evidence(json!({ "robotsMeta": robots_meta }))
        .with_fix_hint_if(noindex, "Remove noindex from meta robots tag"))
}

/// First canonical href, treating an empty attribute as absent
fn canonical_href(ctx: &AuditContext) -> Result<Option<String>, CheckEvaluationError> {
    Ok(ctx
        .first_attr(r#"link[rel="canonical"]"#, "href")?
        .filter(|href| !href.is_empty()))
}

pub(super) fn canonical_present(ctx: &AuditContext) -> Result<Finding, CheckEvaluationError> {
    let canonical = canonical_href(ctx)?;
    let present = canonical.is_some();

    let finding = if present {
        Finding::new(CheckStatus::Pass, "Canonical tag present")
    } else {
        Finding::new(CheckStatus::Fail, "No canonical tag found")
    };

    Ok(finding
        .with_evidence(json!({ "canonical": canonical }))
        .with_fix_hint_if(
            !present,
            "Add a canonical tag pointing to the preferred URL",
        ))
}

pub(super) fn canonical_self(ctx: &AuditContext) -> Result<Finding, CheckEvaluationError> {
    let Some(canonical) = canonical_href(ctx)? else {
        return Ok(Finding::new(
            CheckStatus::Skip,
            "No canonical tag to evaluate",
        ));
    };

    let is_self = canonical_points_to(ctx.url(), &canonical)?;

    let finding = if is_self {
        Finding::new(CheckStatus::Pass, "Canonical points to self")
    } else {
        Finding::new(CheckStatus::Warn, "Canonical points to different URL")
    };

    Ok(finding
        .with_evidence(json!({ "canonical": canonical, "pageUrl": ctx.url() }))
        .with_fix_hint_if(
            !is_self,
            "Consider if this page should have a self-referencing canonical",
        ))
}

pub(super) fn response_time(ctx: &AuditContext) -> Result<Finding, CheckEvaluationError> {
    let time = ctx.response_time_ms();

    let finding = if time > VERY_SLOW_RESPONSE_MS {
        Finding::new(
            CheckStatus::Fail,
            format!("Response time: {}ms (very slow)", time),
        )
    } else if time > SLOW_RESPONSE_MS {
        Finding::new(CheckStatus::Warn, format!("Response time: {}ms (slow)", time))
    } else {
        Finding::new(CheckStatus::Pass, format!("Response time: {}ms (fast)", time))
    };

    let slow = finding.status != CheckStatus::Pass;
    Ok(finding
        .with_evidence(json!({ "responseTime": time }))
        .with_fix_hint_if(slow, "Improve server response time"))
}
