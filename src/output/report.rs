//! Run detail and listing queries

use crate::audit::{AuditScore, CheckResult};
use crate::output::OutputResult;
use crate::storage::{BatchRecord, PageRecord, RunRecord, Storage};

/// Number of entries returned by history listings when no limit is given
pub const DEFAULT_HISTORY_LIMIT: u32 = 20;

/// Full result of one run
#[derive(Debug, Clone, PartialEq)]
pub struct RunDetail {
    pub run: RunRecord,
    pub page: PageRecord,
    /// Ordered by severity, then PASS, WARN, FAIL, SKIP
    pub checks: Vec<CheckResult>,
    pub score: Option<AuditScore>,
}

/// Loads a run with its checks and score
pub fn run_detail(storage: &dyn Storage, run_id: i64) -> OutputResult<RunDetail> {
    let run = storage.get_run(run_id)?;
    let page = storage.get_page(run.page_id)?;
    let mut checks = storage.get_run_checks(run_id)?;
    // Stable, so evaluation order breaks ties
    checks.sort_by_key(|c| (c.severity, c.status));
    let score = storage.get_run_score(run_id)?;

    Ok(RunDetail {
        run,
        page,
        checks,
        score,
    })
}

/// Most recent runs of a page, newest first
pub fn page_history(
    storage: &dyn Storage,
    page_id: i64,
    limit: Option<u32>,
) -> OutputResult<Vec<RunRecord>> {
    storage.get_page(page_id)?;
    Ok(storage.list_page_runs(page_id, limit.unwrap_or(DEFAULT_HISTORY_LIMIT))?)
}

/// Most recent batches of a project, newest first
pub fn project_batches(
    storage: &dyn Storage,
    project: &str,
    limit: Option<u32>,
) -> OutputResult<Vec<BatchRecord>> {
    Ok(storage.list_project_batches(project, limit.unwrap_or(DEFAULT_HISTORY_LIMIT))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::{Category, CheckStatus, Severity};
    use crate::storage::{RunCompletion, SqliteStorage};

    fn check(id: &str, severity: Severity, status: CheckStatus) -> CheckResult {
        CheckResult {
            check_id: id.to_string(),
            category: Category::Content,
            status,
            severity,
            message: id.to_string(),
            evidence: None,
            fix_hint: None,
        }
    }

    #[test]
    fn test_run_detail_orders_checks() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let (page_id, _) = storage.register_page("shop", "u", "u").unwrap();
        let run = storage.create_run(page_id).unwrap();
        storage.mark_run_running(run.id).unwrap();
        storage
            .complete_run(
                run.id,
                &RunCompletion {
                    http_status: 200,
                    response_time_ms: 10,
                    final_url: "u".to_string(),
                    html_snapshot: String::new(),
                    checks: vec![
                        check("low_skip", Severity::Low, CheckStatus::Skip),
                        check("crit_fail", Severity::Critical, CheckStatus::Fail),
                        check("low_pass", Severity::Low, CheckStatus::Pass),
                        check("crit_pass", Severity::Critical, CheckStatus::Pass),
                        check("high_warn", Severity::High, CheckStatus::Warn),
                    ],
                    score: AuditScore::default(),
                },
            )
            .unwrap();

        let detail = run_detail(&storage, run.id).unwrap();
        let order: Vec<_> = detail.checks.iter().map(|c| c.check_id.as_str()).collect();
        assert_eq!(
            order,
            ["crit_pass", "crit_fail", "high_warn", "low_pass", "low_skip"]
        );
        assert!(detail.score.is_some());
        assert_eq!(detail.page.id, page_id);
    }

    #[test]
    fn test_history_respects_limit() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let (page_id, _) = storage.register_page("shop", "u", "u").unwrap();
        for _ in 0..25 {
            storage.create_run(page_id).unwrap();
        }

        assert_eq!(page_history(&storage, page_id, None).unwrap().len(), 20);
        assert_eq!(page_history(&storage, page_id, Some(5)).unwrap().len(), 5);
        assert!(page_history(&storage, 999, None).is_err());
    }

    #[test]
    fn test_project_batches_empty() {
        let storage = SqliteStorage::new_in_memory().unwrap();
        assert!(project_batches(&storage, "none", None).unwrap().is_empty());
    }
}
