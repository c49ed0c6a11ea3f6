//! Audit module for evaluating pages
//!
//! This module contains the audit pipeline, including:
//! - HTTP fetching of page markup and transport metadata
//! - The check catalogue and the engine that runs it
//! - Weighted scoring of check results
//! - Run execution and batch coordination

pub mod checks;
mod context;
mod coordinator;
mod engine;
mod executor;
mod fetcher;
mod score;

pub use checks::{
    Category, CheckDefinition, CheckEvaluationError, CheckResult, CheckStatus, Evidence, Finding,
    Severity, CATALOGUE,
};
pub use context::AuditContext;
pub use coordinator::{BatchCoordinator, CreatedBatch, CreatedRun};
pub use engine::CheckEngine;
pub use executor::{RunExecutor, RunOutcome};
pub use fetcher::{build_http_client, FetchedPage, PageFetcher, ResponseHeaders};
pub use score::{AuditScore, ScoreCalculator};
