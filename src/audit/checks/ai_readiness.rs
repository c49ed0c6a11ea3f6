//! Signals that make product facts easy to extract

use super::schema::JSON_LD_SELECTOR;
use super::{CheckEvaluationError, CheckStatus, Finding};
use crate::audit::context::AuditContext;
use serde_json::json;

const SPEC_SECTION_SELECTOR: &str = r#"[class*="spec"], [class*="detail"], [class*="attribute"]"#;
const FAQ_SECTION_SELECTOR: &str = r#"[class*="faq"], [id*="faq"], [class*="question"]"#;

pub(super) fn structured_specs(ctx: &AuditContext) -> Result<Finding, CheckEvaluationError> {
    let has_tables = ctx.count("table")? > 0;
    let has_definition_lists = ctx.count("dl")? > 0;
    let has_specs_section = ctx.count(SPEC_SECTION_SELECTOR)? > 0;
    let structured = has_tables || has_definition_lists || has_specs_section;

    let finding = if structured {
        Finding::new(CheckStatus::Pass, "Structured specifications found")
    } else {
        Finding::new(CheckStatus::Warn, "No structured specifications detected")
    };

    Ok(finding
        .with_evidence(json!({
            "hasTables": has_tables,
            "hasDefinitionLists": has_definition_lists,
            "hasSpecsSection": has_specs_section,
        }))
        .with_fix_hint_if(
            !structured,
            "Add structured product specifications (table or definition list)",
        ))
}

pub(super) fn faq_present(ctx: &AuditContext) -> Result<Finding, CheckEvaluationError> {
    let has_faq_schema = ctx.text_of(JSON_LD_SELECTOR)?.contains("FAQPage");
    let has_faq_section = ctx.count(FAQ_SECTION_SELECTOR)? > 0;
    let has_faq = has_faq_schema || has_faq_section;

    let finding = if has_faq {
        Finding::new(CheckStatus::Pass, "FAQ section detected")
    } else {
        Finding::new(
            CheckStatus::Skip,
            "No FAQ section found (optional but good for AI)",
        )
    };

    Ok(finding
        .with_evidence(json!({
            "hasFaqSchema": has_faq_schema,
            "hasFaqSection": has_faq_section,
        }))
        .with_fix_hint_if(
            !has_faq,
            "Consider adding a FAQ section for common product questions",
        ))
}
