//! Title and meta description checks

use super::{CheckEvaluationError, CheckStatus, Finding};
use crate::audit::context::AuditContext;
use serde_json::json;

const TITLE_MIN_CHARS: usize = 30;
const TITLE_MAX_CHARS: usize = 60;
const DESCRIPTION_MIN_CHARS: usize = 120;
const DESCRIPTION_MAX_CHARS: usize = 160;

/// Evidence keeps at most this much of the description
const DESCRIPTION_EVIDENCE_CHARS: usize = 200;

fn title(ctx: &AuditContext) -> Result<String, CheckEvaluationError> {
    Ok(ctx.text_of("title")?.trim().to_string())
}

fn description(ctx: &AuditContext) -> Result<String, CheckEvaluationError> {
    Ok(ctx
        .first_attr(r#"meta[name="description"]"#, "content")?
        .map(|content| content.trim().to_string())
        .unwrap_or_default())
}

pub(super) fn title_present(ctx: &AuditContext) -> Result<Finding, CheckEvaluationError> {
    let title = title(ctx)?;
    let present = !title.is_empty();

    let finding = if present {
        Finding::new(CheckStatus::Pass, "Title tag present")
    } else {
        Finding::new(CheckStatus::Fail, "No title tag found")
    };

    Ok(finding
        .with_evidence(json!({ "title": title }))
        .with_fix_hint_if(!present, "Add a descriptive title tag"))
}

pub(super) fn title_length(ctx: &AuditContext) -> Result<Finding, CheckEvaluationError> {
    let title = title(ctx)?;
    let len = title.chars().count();

    let finding = if len == 0 {
        Finding::new(CheckStatus::Fail, "No title tag")
    } else if len < TITLE_MIN_CHARS {
        Finding::new(
            CheckStatus::Warn,
            format!("Title too short ({} chars, recommend 30-60)", len),
        )
    } else if len > TITLE_MAX_CHARS {
        Finding::new(
            CheckStatus::Warn,
            format!("Title may be truncated ({} chars, recommend 30-60)", len),
        )
    } else {
        Finding::new(
            CheckStatus::Pass,
            format!("Title length is {} characters (optimal)", len),
        )
    };

    let off_band = finding.status != CheckStatus::Pass;
    Ok(finding
        .with_evidence(json!({ "title": title, "length": len }))
        .with_fix_hint_if(off_band, "Keep title between 30-60 characters"))
}

pub(super) fn meta_desc_present(ctx: &AuditContext) -> Result<Finding, CheckEvaluationError> {
    let description = description(ctx)?;
    let present = !description.is_empty();

    let finding = if present {
        Finding::new(CheckStatus::Pass, "Meta description present")
    } else {
        Finding::new(CheckStatus::Fail, "No meta description found")
    };

    let excerpt: Option<String> =
        present.then(|| description.chars().take(DESCRIPTION_EVIDENCE_CHARS).collect());

    Ok(finding
        .with_evidence(json!({ "description": excerpt }))
        .with_fix_hint_if(!present, "Add a compelling meta description"))
}

pub(super) fn meta_desc_length(ctx: &AuditContext) -> Result<Finding, CheckEvaluationError> {
    let len = description(ctx)?.chars().count();

    let finding = if len == 0 {
        Finding::new(CheckStatus::Skip, "No meta description to evaluate")
    } else if len < DESCRIPTION_MIN_CHARS {
        Finding::new(
            CheckStatus::Warn,
            format!("Meta description short ({} chars, recommend 120-160)", len),
        )
    } else if len > DESCRIPTION_MAX_CHARS {
        Finding::new(
            CheckStatus::Warn,
            format!("Meta description may be truncated ({} chars)", len),
        )
    } else {
        Finding::new(
            CheckStatus::Pass,
            format!("Meta description length is {} characters (optimal)", len),
        )
    };

    let warn = finding.status == CheckStatus::Warn;
    Ok(finding
        .with_evidence(json!({ "length": len }))
        .with_fix_hint_if(warn, "Keep meta description between 120-160 characters"))
}
