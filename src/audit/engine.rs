//! Check engine
//!
//! Runs every check in a catalogue against one page. A check that returns
//! an error or panics is recorded as SKIP and never stops the rest.

use crate::audit::checks::{CheckDefinition, CheckResult, CATALOGUE};
use crate::audit::context::AuditContext;
use crate::audit::score::{AuditScore, ScoreCalculator};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

/// Evaluates a fixed list of checks
#[derive(Debug, Clone, Copy)]
pub struct CheckEngine {
    checks: &'static [CheckDefinition],
}

impl Default for CheckEngine {
    fn default() -> Self {
        Self::with_checks(CATALOGUE)
    }
}

impl CheckEngine {
    /// Creates an engine over a custom check list
    pub fn with_checks(checks: &'static [CheckDefinition]) -> Self {
        Self { checks }
    }

    pub fn checks(&self) -> &'static [CheckDefinition] {
        self.checks
    }

    /// Runs all checks in order, returning one result per check
    pub fn run_all_checks(&self, context: &AuditContext) -> Vec<CheckResult> {
        self.checks
            .iter()
            .map(|check| run_isolated(check, context))
            .collect()
    }

    /// Scores results against this engine's checks
    pub fn calculate_score(&self, results: &[CheckResult]) -> AuditScore {
        ScoreCalculator::new(self.checks).calculate(results)
    }
}

fn run_isolated(check: &CheckDefinition, context: &AuditContext) -> CheckResult {
    match panic::catch_unwind(AssertUnwindSafe(|| check.run(context))) {
        Ok(Ok(result)) => {
            tracing::debug!("Check {}: {}", check.id, result.status);
            result
        }
        Ok(Err(e)) => {
            tracing::warn!("Check {} could not be evaluated: {}", check.id, e);
            check.skipped(&e.to_string())
        }
        Err(payload) => {
            let reason = panic_message(payload.as_ref());
            tracing::warn!("Check {} panicked: {}", check.id, reason);
            check.skipped(&reason)
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
