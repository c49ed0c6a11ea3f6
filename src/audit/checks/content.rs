//! Headings, imagery and body copy

use super::{CheckEvaluationError, CheckStatus, Finding};
use crate::audit::context::AuditContext;
use serde_json::json;

const THIN_CONTENT_WORDS: usize = 100;
const SHORT_CONTENT_WORDS: usize = 300;

pub(super) fn h1_present(ctx: &AuditContext) -> Result<Finding, CheckEvaluationError> {
    let headings = ctx.select("h1")?;
    let count = headings.len();
    let first_text = headings
        .first()
        .map(|h1| h1.text().collect::<String>().trim().to_string())
        .unwrap_or_default();

    let finding = if count > 0 {
        Finding::new(CheckStatus::Pass, "H1 tag present")
    } else {
        Finding::new(CheckStatus::Fail, "No H1 tag found")
    };

    Ok(finding
        .with_evidence(json!({ "h1": first_text, "count": count }))
        .with_fix_hint_if(count == 0, "Add a descriptive H1 tag for the product"))
}

pub(super) fn h1_single(ctx: &AuditContext) -> Result<Finding, CheckEvaluationError> {
    let count = ctx.count("h1")?;

    let finding = match count {
        0 => Finding::new(CheckStatus::Skip, "No H1 tag"),
        1 => Finding::new(CheckStatus::Pass, "Single H1 tag (good)"),
        n => Finding::new(
            CheckStatus::Warn,
            format!("Multiple H1 tags found ({})", n),
        ),
    };

    Ok(finding
        .with_evidence(json!({ "count": count }))
        .with_fix_hint_if(count > 1, "Consider using only one H1 tag per page"))
}

pub(super) fn images_present(ctx: &AuditContext) -> Result<Finding, CheckEvaluationError> {
    let count = ctx.count("img")?;

    let finding = if count > 0 {
        Finding::new(CheckStatus::Pass, format!("{} images found", count))
    } else {
        Finding::new(CheckStatus::Fail, "No images found")
    };

    Ok(finding
        .with_evidence(json!({ "imageCount": count }))
        .with_fix_hint_if(count == 0, "Add product images"))
}

pub(super) fn images_have_alt(ctx: &AuditContext) -> Result<Finding, CheckEvaluationError> {
    let images = ctx.select("img")?;
    let total = images.len();
    let with_alt = images
        .iter()
        .filter(|img| img.value().attr("alt").is_some_and(|alt| !alt.is_empty()))
        .count();

    if total == 0 {
        return Ok(Finding::new(CheckStatus::Skip, "No images to evaluate")
            .with_evidence(json!({ "total": 0, "withAlt": 0, "percentage": 0 })));
    }

    let percentage = (with_alt as f64 / total as f64 * 100.0).round() as u32;
    let status = if percentage < 50 {
        CheckStatus::Fail
    } else if percentage < 100 {
        CheckStatus::Warn
    } else {
        CheckStatus::Pass
    };

    Ok(Finding::new(
        status,
        format!(
            "{}/{} images have alt text ({}%)",
            with_alt, total, percentage
        ),
    )
    .with_evidence(json!({
        "total": total,
        "withAlt": with_alt,
        "percentage": percentage,
    }))
    .with_fix_hint_if(
        status != CheckStatus::Pass,
        "Add descriptive alt text to all product images",
    ))
}

pub(super) fn content_length(ctx: &AuditContext) -> Result<Finding, CheckEvaluationError> {
    let body_text = ctx.text_of("body")?;
    let word_count = body_text.split_whitespace().count();

    let finding = if word_count < THIN_CONTENT_WORDS {
        Finding::new(
            CheckStatus::Fail,
            format!("Very thin content ({} words)", word_count),
        )
    } else if word_count < SHORT_CONTENT_WORDS {
        Finding::new(
            CheckStatus::Warn,
            format!("Content may be thin ({} words)", word_count),
        )
    } else {
        Finding::new(
            CheckStatus::Pass,
            format!("Content has {} words", word_count),
        )
    };

    let thin = finding.status != CheckStatus::Pass;
    Ok(finding
        .with_evidence(json!({ "wordCount": word_count }))
        .with_fix_hint_if(thin, "Add more descriptive content about the product"))
}
