//! Markdown run report generation
//!
//! This module renders one run as a human-readable markdown report: run
//! metadata, the score table, and every check grouped by status.

use crate::audit::{Category, CheckStatus};
use crate::output::report::RunDetail;
use crate::output::OutputResult;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes a markdown report for a run
///
/// # Arguments
///
/// * `detail` - The run to report on
/// * `output_path` - Path where the markdown file should be written
pub fn write_run_report(detail: &RunDetail, output_path: &Path) -> OutputResult<()> {
    let markdown = format_run_report(detail);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats a run as markdown
pub fn format_run_report(detail: &RunDetail) -> String {
    let run = &detail.run;
    let mut md = String::new();

    md.push_str(&format!("# Page Audit Report: Run {}\n\n", run.id));

    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **URL**: {}\n", run.url));
    md.push_str(&format!("- **Project**: {}\n", detail.page.project));
    md.push_str(&format!("- **Status**: {}\n", run.status));
    if let Some(batch_id) = run.batch_id {
        md.push_str(&format!("- **Batch**: {}\n", batch_id));
    }
    md.push_str(&format!("- **Created**: {}\n", run.created_at));
    if let Some(started) = &run.started_at {
        md.push_str(&format!("- **Started**: {}\n", started));
    }
    if let Some(completed) = &run.completed_at {
        md.push_str(&format!("- **Finished**: {}\n", completed));
    }
    if let Some(status) = run.http_status {
        md.push_str(&format!("- **HTTP Status**: {}\n", status));
    }
    if let Some(ms) = run.response_time_ms {
        md.push_str(&format!("- **Response Time**: {} ms\n", ms));
    }
    if let Some(final_url) = &run.final_url {
        if final_url != &run.url {
            md.push_str(&format!("- **Final URL**: {}\n", final_url));
        }
    }
    if let Some(error) = &run.error_message {
        md.push_str(&format!("- **Error**: {}\n", error));
    }
    md.push('\n');

    if let Some(score) = &detail.score {
        md.push_str("## Scores\n\n");
        md.push_str("| Category | Score |\n");
        md.push_str("|----------|-------|\n");
        md.push_str(&format!("| **Overall** | **{}** |\n", score.overall));
        for category in Category::ALL {
            md.push_str(&format!("| {} | {} |\n", category, score.category(category)));
        }
        md.push('\n');
    }

    if detail.checks.is_empty() {
        return md;
    }

    md.push_str("## Checks\n\n");
    for status in [
        CheckStatus::Fail,
        CheckStatus::Warn,
        CheckStatus::Skip,
        CheckStatus::Pass,
    ] {
        let group: Vec<_> = detail.checks.iter().filter(|c| c.status == status).collect();
        if group.is_empty() {
            continue;
        }

        md.push_str(&format!("### {} ({})\n\n", status, group.len()));
        for check in group {
            md.push_str(&format!(
                "- **{}** [{} / {}]: {}\n",
                check.check_id, check.category, check.severity, check.message
            ));
            if let Some(hint) = &check.fix_hint {
                md.push_str(&format!("  - Fix: {}\n", hint));
            }
        }
        md.push('\n');
    }

    md
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::{AuditScore, CheckResult, Severity};
    use crate::state::RunStatus;
    use crate::storage::{PageRecord, RunRecord};

    fn detail() -> RunDetail {
        RunDetail {
            run: RunRecord {
                id: 7,
                page_id: 1,
                batch_id: Some(3),
                url: "https://shop.example/lamp".to_string(),
                status: RunStatus::Completed,
                created_at: "2024-01-01T00:00:00+00:00".to_string(),
                started_at: Some("2024-01-01T00:00:01+00:00".to_string()),
                completed_at: Some("2024-01-01T00:00:02+00:00".to_string()),
                http_status: Some(200),
                response_time_ms: Some(250),
                final_url: Some("https://shop.example/lamp".to_string()),
                error_message: None,
            },
            page: PageRecord {
                id: 1,
                project: "shop".to_string(),
                url: "https://shop.example/lamp".to_string(),
                normalized_url: "https://shop.example/lamp".to_string(),
                latest_score: Some(72),
                created_at: "2024-01-01T00:00:00+00:00".to_string(),
            },
            checks: vec![
                CheckResult {
                    check_id: "title_present".to_string(),
                    category: Category::Metadata,
                    status: CheckStatus::Pass,
                    severity: Severity::Critical,
                    message: "Title tag present".to_string(),
                    evidence: None,
                    fix_hint: None,
                },
                CheckResult {
                    check_id: "images_present".to_string(),
                    category: Category::Content,
                    status: CheckStatus::Fail,
                    severity: Severity::High,
                    message: "No images found".to_string(),
                    evidence: None,
                    fix_hint: Some("Add product images".to_string()),
                },
            ],
            score: Some(AuditScore {
                overall: 72,
                ..AuditScore::default()
            }),
        }
    }

    #[test]
    fn test_report_contains_scores_and_checks() {
        let md = format_run_report(&detail());
        assert!(md.contains("# Page Audit Report: Run 7"));
        assert!(md.contains("| **Overall** | **72** |"));
        assert!(md.contains("| variantRisk | 0 |"));
        assert!(md.contains("### FAIL (1)"));
        assert!(md.contains("  - Fix: Add product images"));
        assert!(!md.contains("Final URL"));
    }

    #[test]
    fn test_failures_are_listed_before_passes() {
        let md = format_run_report(&detail());
        let fail = md.find("### FAIL").unwrap();
        let pass = md.find("### PASS").unwrap();
        assert!(fail < pass);
    }

    #[test]
    fn test_failed_run_report() {
        let mut detail = detail();
        detail.run.status = RunStatus::Failed;
        detail.run.error_message = Some("Request timeout".to_string());
        detail.checks.clear();
        detail.score = None;

        let md = format_run_report(&detail);
        assert!(md.contains("- **Error**: Request timeout"));
        assert!(!md.contains("## Scores"));
        assert!(!md.contains("## Checks"));
    }

    #[test]
    fn test_write_run_report() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.md");
        write_run_report(&detail(), &path).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("# Page Audit Report"));
    }
}
