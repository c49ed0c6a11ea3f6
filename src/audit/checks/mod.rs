//! Check catalogue and the types every check shares
//!
//! A check is a plain record: identity, category, severity, weight, and a
//! function pointer that inspects an [`AuditContext`]. The catalogue is a
//! static slice of these records, evaluated in order by the
//! [`CheckEngine`](crate::audit::CheckEngine).

mod ai_readiness;
mod catalogue;
mod content;
mod indexability;
mod metadata;
mod schema;
mod variant_risk;

pub use catalogue::CATALOGUE;

use crate::audit::context::AuditContext;
use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;

/// Structured diagnostic data attached to a check result
pub type Evidence = Map<String, Value>;

/// Signature of a check's evaluation function
pub type Evaluator = fn(&AuditContext) -> Result<Finding, CheckEvaluationError>;

/// Raised by an evaluator that cannot judge the page
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct CheckEvaluationError(pub String);

impl CheckEvaluationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

impl From<crate::UrlError> for CheckEvaluationError {
    fn from(err: crate::UrlError) -> Self {
        Self(err.to_string())
    }
}

/// Scoring category a check belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Indexability,
    Metadata,
    Content,
    Schema,
    VariantRisk,
    AiReadiness,
}

impl Category {
    /// All categories, in report order
    pub const ALL: [Category; 6] = [
        Category::Indexability,
        Category::Metadata,
        Category::Content,
        Category::Schema,
        Category::VariantRisk,
        Category::AiReadiness,
    ];

    /// Share of the overall score carried by this category (sums to 100)
    pub fn score_weight(&self) -> u32 {
        match self {
            Self::Indexability => 25,
            Self::Schema => 25,
            Self::Metadata => 20,
            Self::Content => 15,
            Self::VariantRisk => 10,
            Self::AiReadiness => 5,
        }
    }

    /// Position of this category in [`Category::ALL`]
    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Indexability => "indexability",
            Self::Metadata => "metadata",
            Self::Content => "content",
            Self::Schema => "schema",
            Self::VariantRisk => "variantRisk",
            Self::AiReadiness => "aiReadiness",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == s)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How much a failing check matters, most severe first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
    Info,
}

impl Severity {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Critical => "CRITICAL",
            Self::High => "HIGH",
            Self::Medium => "MEDIUM",
            Self::Low => "LOW",
            Self::Info => "INFO",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "CRITICAL" => Some(Self::Critical),
            "HIGH" => Some(Self::High),
            "MEDIUM" => Some(Self::Medium),
            "LOW" => Some(Self::Low),
            "INFO" => Some(Self::Info),
            _ => None,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_db_string())
    }
}

/// Verdict of one check
///
/// Declaration order is the order results are listed in reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CheckStatus {
    Pass,
    Warn,
    Fail,
    Skip,
}

impl CheckStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Pass => "PASS",
            Self::Warn => "WARN",
            Self::Fail => "FAIL",
            Self::Skip => "SKIP",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "PASS" => Some(Self::Pass),
            "WARN" => Some(Self::Warn),
            "FAIL" => Some(Self::Fail),
            "SKIP" => Some(Self::Skip),
            _ => None,
        }
    }
}

impl fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_db_string())
    }
}

/// What an evaluator concluded about a page
///
/// The owning [`CheckDefinition`] turns a finding into a [`CheckResult`] by
/// stamping its own id, category and severity on it.
#[derive(Debug, Clone, PartialEq)]
pub struct Finding {
    pub status: CheckStatus,
    pub message: String,
    pub evidence: Option<Evidence>,
    pub fix_hint: Option<String>,
}

impl Finding {
    pub fn new(status: CheckStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            evidence: None,
            fix_hint: None,
        }
    }

    /// Attaches evidence; non-object values are ignored
    pub fn with_evidence(mut self, evidence: Value) -> Self {
        if let Value::Object(map) = evidence {
            self.evidence = Some(map);
        }
        self
    }

    /// Attaches a fix hint when `condition` holds
    pub fn with_fix_hint_if(mut self, condition: bool, hint: &str) -> Self {
        if condition {
            self.fix_hint = Some(hint.to_string());
        }
        self
    }
}

/// Outcome of one check for one run
#[derive(Debug, Clone, PartialEq)]
pub struct CheckResult {
    pub check_id: String,
    pub category: Category,
    pub status: CheckStatus,
    pub severity: Severity,
    pub message: String,
    pub evidence: Option<Evidence>,
    pub fix_hint: Option<String>,
}

/// Static descriptor of one check
#[derive(Clone, Copy)]
pub struct CheckDefinition {
    pub id: &'static str,
    pub name: &'static str,
    pub category: Category,
    pub severity: Severity,
    pub weight: u32,
    pub evaluate: Evaluator,
}

impl fmt::Debug for CheckDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CheckDefinition")
            .field("id", &self.id)
            .field("category", &self.category)
            .field("severity", &self.severity)
            .field("weight", &self.weight)
            .finish_non_exhaustive()
    }
}

impl CheckDefinition {
    /// Evaluates this check against a page
    pub fn run(&self, context: &AuditContext) -> Result<CheckResult, CheckEvaluationError> {
        let finding = (self.evaluate)(context)?;
        Ok(CheckResult {
            check_id: self.id.to_string(),
            category: self.category,
            status: finding.status,
            severity: self.severity,
            message: finding.message,
            evidence: finding.evidence,
            fix_hint: finding.fix_hint,
        })
    }

    /// Result recorded in place of a check that could not be evaluated
    pub fn skipped(&self, reason: &str) -> CheckResult {
        CheckResult {
            check_id: self.id.to_string(),
            category: self.category,
            status: CheckStatus::Skip,
            severity: self.severity,
            message: format!("Check failed: {}", reason),
            evidence: None,
            fix_hint: None,
        }
    }
}
