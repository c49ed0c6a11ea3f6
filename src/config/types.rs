use serde::Deserialize;

/// Default identifying header sent with every page request
pub const DEFAULT_USER_AGENT: &str = "ProductPageIntelligence/1.0 (SEO Audit Bot)";

/// Main configuration structure for Page-Audit
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub fetcher: FetcherConfig,
    #[serde(default)]
    pub executor: ExecutorConfig,
    pub output: OutputConfig,
}

/// HTTP fetcher configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FetcherConfig {
    /// Value of the User-Agent header
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    /// Whole-request timeout, body included (seconds)
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// TCP/TLS connect timeout (seconds)
    #[serde(rename = "connect-timeout-secs", default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Maximum number of redirects followed before giving up
    #[serde(rename = "max-redirects", default = "default_max_redirects")]
    pub max_redirects: usize,
}

/// Run execution configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ExecutorConfig {
    /// Maximum number of runs of one batch executing at the same time
    #[serde(rename = "max-concurrent-runs", default = "default_max_concurrent_runs")]
    pub max_concurrent_runs: u32,

    /// Number of markup characters kept on a completed run
    #[serde(rename = "snapshot-limit", default = "default_snapshot_limit")]
    pub snapshot_limit: usize,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,

    /// Path to the markdown run report
    #[serde(rename = "report-path")]
    pub report_path: String,
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_max_redirects() -> usize {
    10
}

fn default_max_concurrent_runs() -> u32 {
    5
}

fn default_snapshot_limit() -> usize {
    50_000
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            max_redirects: default_max_redirects(),
        }
    }
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            max_concurrent_runs: default_max_concurrent_runs(),
            snapshot_limit: default_snapshot_limit(),
        }
    }
}
