//! Page-Audit main entry point
//!
//! This is the command-line interface for the Page-Audit product page auditor.

use anyhow::Context;
use clap::Parser;
use page_audit::audit::{CheckStatus, CATALOGUE};
use page_audit::config::{load_config_with_hash, Config};
use page_audit::output::{
    batch_status, format_run_report, page_history, print_batch_status, project_batches,
    run_detail, write_run_report,
};
use page_audit::storage::{self, open_storage, SqliteStorage, Storage};
use page_audit::{import_pages, register_page, BatchCoordinator};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Project used by --audit-url when --project is not given
const DEFAULT_PROJECT: &str = "default";

/// Page-Audit: a product page quality auditor
///
/// Page-Audit fetches product pages, runs a fixed catalogue of indexability,
/// metadata, content, structured data, variant and AI-readiness checks
/// against them, and stores weighted scores for every run.
#[derive(Parser, Debug)]
#[command(name = "page-audit")]
#[command(version = "1.0.0")]
#[command(about = "A product page quality auditor", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Register the URLs listed in FILE (one per line) under --project
    #[arg(long, value_name = "FILE", requires = "project", group = "mode")]
    import: Option<PathBuf>,

    /// Project the imported or audited URL belongs to
    #[arg(long, value_name = "NAME")]
    project: Option<String>,

    /// Audit every registered page of a project as one batch
    #[arg(long, value_name = "NAME", group = "mode")]
    audit_project: Option<String>,

    /// Register a single URL and audit it
    #[arg(long, value_name = "URL", group = "mode")]
    audit_url: Option<String>,

    /// Show progress of a batch and exit
    #[arg(long, value_name = "ID", group = "mode")]
    batch_status: Option<i64>,

    /// Show a run in detail and write its markdown report
    #[arg(long, value_name = "ID", group = "mode")]
    run: Option<i64>,

    /// Show recent runs of a page
    #[arg(long, value_name = "PAGE_ID", group = "mode")]
    history: Option<i64>,

    /// Validate config and list the check catalogue without auditing
    #[arg(long, group = "mode")]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (cfg, hash)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e).context(format!("loading {}", cli.config.display()));
        }
    };

    // Handle different modes
    if cli.dry_run {
        handle_dry_run(&config);
    } else if let Some(file) = &cli.import {
        let project = cli.project.as_deref().context("--import needs --project")?;
        handle_import(&config, file, project)?;
    } else if let Some(project) = &cli.audit_project {
        handle_audit_project(&config, &config_hash, project).await?;
    } else if let Some(url) = &cli.audit_url {
        let project = cli.project.as_deref().unwrap_or(DEFAULT_PROJECT);
        handle_audit_url(&config, &config_hash, project, url).await?;
    } else if let Some(batch_id) = cli.batch_status {
        let storage = open_database(&config)?;
        print_batch_status(&batch_status(&storage, batch_id)?);
    } else if let Some(run_id) = cli.run {
        handle_run(&config, run_id)?;
    } else if let Some(page_id) = cli.history {
        handle_history(&config, page_id)?;
    } else {
        anyhow::bail!(
            "no mode given; use one of --import, --audit-project, --audit-url, \
             --batch-status, --run, --history or --dry-run"
        );
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("page_audit=info,warn"),
            1 => EnvFilter::new("page_audit=debug,info"),
            2 => EnvFilter::new("page_audit=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

fn open_database(config: &Config) -> anyhow::Result<SqliteStorage> {
    let path = Path::new(&config.output.database_path);
    open_storage(path).with_context(|| format!("opening database {}", path.display()))
}

/// Handles the --dry-run mode: shows the configuration and check catalogue
fn handle_dry_run(config: &Config) {
    println!("=== Page-Audit Dry Run ===\n");

    println!("Fetcher:");
    println!("  User agent: {}", config.fetcher.user_agent);
    println!("  Timeout: {}s", config.fetcher.timeout_secs);
    println!("  Connect timeout: {}s", config.fetcher.connect_timeout_secs);
    println!("  Max redirects: {}", config.fetcher.max_redirects);

    println!("\nExecutor:");
    println!("  Max concurrent runs: {}", config.executor.max_concurrent_runs);
    println!("  Snapshot limit: {} chars", config.executor.snapshot_limit);

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);
    println!("  Report: {}", config.output.report_path);

    println!("\nChecks ({}):", CATALOGUE.len());
    for check in CATALOGUE {
        println!(
            "  - {:<28} {:<12} {:<8} weight {}",
            check.id,
            check.category.as_str(),
            check.severity.to_db_string(),
            check.weight
        );
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the --import mode: registers pages from a URL list file
fn handle_import(config: &Config, file: &Path, project: &str) -> anyhow::Result<()> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("reading URL list {}", file.display()))?;

    let mut storage = open_database(config)?;
    let summary = import_pages(&mut storage, project, content.lines());

    println!("=== Import into '{}' ===\n", project);
    println!("  Created: {}", summary.created);
    println!("  Already registered: {}", summary.skipped);
    println!("  Rejected: {}", summary.errors.len());
    for error in &summary.errors {
        println!("    * {}", error);
    }

    Ok(())
}

/// Handles the --audit-project mode: audits all pages of a project
async fn handle_audit_project(
    config: &Config,
    config_hash: &str,
    project: &str,
) -> anyhow::Result<()> {
    let coordinator = BatchCoordinator::from_config(config, config_hash, open_database(config)?)?;

    let created = coordinator.create_project_batch(project)?;
    tracing::info!(
        "Auditing {} pages of '{}' in batch {}",
        created.runs.len(),
        project,
        created.batch.id
    );

    match created.processing.await? {
        Ok(batch) => {
            let guard = storage::lock(coordinator.storage());
            print_batch_status(&batch_status(&*guard, batch.id)?);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Batch {} failed: {}", created.batch.id, e);
            Err(e.into())
        }
    }
}

/// Handles the --audit-url mode: registers one URL and audits it
async fn handle_audit_url(
    config: &Config,
    config_hash: &str,
    project: &str,
    url: &str,
) -> anyhow::Result<()> {
    let coordinator = BatchCoordinator::from_config(config, config_hash, open_database(config)?)?;

    let (page_id, _) = {
        let mut guard = storage::lock(coordinator.storage());
        register_page(&mut *guard, project, url)?
    };

    let created = coordinator.run_single_page_audit(page_id)?;
    let outcome = created.processing.await??;

    let guard = storage::lock(coordinator.storage());
    let detail = run_detail(&*guard, outcome.run_id())?;
    print!("{}", format_run_report(&detail));

    Ok(())
}

/// Handles the --run mode: prints a run and writes its markdown report
fn handle_run(config: &Config, run_id: i64) -> anyhow::Result<()> {
    let storage = open_database(config)?;
    let detail = run_detail(&storage, run_id)?;

    print!("{}", format_run_report(&detail));

    let report_path = Path::new(&config.output.report_path);
    write_run_report(&detail, report_path)?;
    println!("✓ Report written to: {}", report_path.display());

    Ok(())
}

/// Handles the --history mode: lists recent runs of a page
fn handle_history(config: &Config, page_id: i64) -> anyhow::Result<()> {
    let storage = open_database(config)?;
    let runs = page_history(&storage, page_id, None)?;
    let page = storage.get_page(page_id)?;

    println!("=== History of page {} ({}) ===\n", page.id, page.url);
    if runs.is_empty() {
        println!("  No runs yet");
    }
    for run in &runs {
        let detail = run_detail(&storage, run.id)?;
        let score = detail
            .score
            .map(|s| s.overall.to_string())
            .unwrap_or_else(|| "-".to_string());
        let failing = detail
            .checks
            .iter()
            .filter(|c| c.status == CheckStatus::Fail)
            .count();
        println!(
            "  Run {:>5}  {:<9}  score {:>3}  {} failing  {}",
            run.id,
            run.status.to_string(),
            score,
            failing,
            run.created_at
        );
    }

    let batches = project_batches(&storage, &page.project, Some(5))?;
    if !batches.is_empty() {
        println!("\nRecent batches of '{}':", page.project);
        for batch in &batches {
            println!(
                "  Batch {:>5}  {:<9}  {}/{} done  {}",
                batch.id,
                batch.status.to_string(),
                batch.finished(),
                batch.total_urls,
                batch.created_at
            );
        }
    }

    Ok(())
}
