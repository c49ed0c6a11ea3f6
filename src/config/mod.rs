//! Configuration module for Page-Audit
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use page_audit::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("audit.toml")).unwrap();
//! println!("Audits will run {} pages at a time", config.executor.max_concurrent_runs);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, ExecutorConfig, FetcherConfig, OutputConfig, DEFAULT_USER_AGENT};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
