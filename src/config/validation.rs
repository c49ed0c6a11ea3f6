use crate::config::types::{Config, ExecutorConfig, FetcherConfig, OutputConfig};
use crate::ConfigError;

/// Upper bound on followed redirects
const MAX_REDIRECT_LIMIT: usize = 20;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_fetcher_config(&config.fetcher)?;
    validate_executor_config(&config.executor)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates fetcher configuration
fn validate_fetcher_config(config: &FetcherConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    if !config.user_agent.is_ascii() {
        return Err(ConfigError::Validation(format!(
            "user_agent must be ASCII, got '{}'",
            config.user_agent
        )));
    }

    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "timeout_secs must be >= 1, got {}",
            config.timeout_secs
        )));
    }

    if config.connect_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "connect_timeout_secs must be >= 1, got {}",
            config.connect_timeout_secs
        )));
    }

    if config.max_redirects > MAX_REDIRECT_LIMIT {
        return Err(ConfigError::Validation(format!(
            "max_redirects must be <= {}, got {}",
            MAX_REDIRECT_LIMIT, config.max_redirects
        )));
    }

    Ok(())
}

/// Validates executor configuration
fn validate_executor_config(config: &ExecutorConfig) -> Result<(), ConfigError> {
    if config.max_concurrent_runs < 1 || config.max_concurrent_runs > 100 {
        return Err(ConfigError::Validation(format!(
            "max_concurrent_runs must be between 1 and 100, got {}",
            config.max_concurrent_runs
        )));
    }

    if config.snapshot_limit < 1 {
        return Err(ConfigError::Validation(
            "snapshot_limit must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }

    if config.report_path.is_empty() {
        return Err(ConfigError::Validation(
            "report_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> Config {
        Config {
            fetcher: FetcherConfig::default(),
            executor: ExecutorConfig::default(),
            output: OutputConfig {
                database_path: "./audits.db".to_string(),
                report_path: "./report.md".to_string(),
            },
        }
    }

    #[test]
    fn test_defaults_are_valid() {
        assert!(validate(&valid_config()).is_ok());
    }

    #[test]
    fn test_rejects_empty_user_agent() {
        let mut config = valid_config();
        config.fetcher.user_agent = "  ".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_concurrency_bounds() {
        let mut config = valid_config();
        config.executor.max_concurrent_runs = 0;
        assert!(validate(&config).is_err());

        config.executor.max_concurrent_runs = 101;
        assert!(validate(&config).is_err());

        config.executor.max_concurrent_runs = 10;
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_rejects_excessive_redirects() {
        let mut config = valid_config();
        config.fetcher.max_redirects = 50;
        assert!(matches!(
            validate(&config),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_rejects_empty_paths() {
        let mut config = valid_config();
        config.output.report_path.clear();
        assert!(validate(&config).is_err());
    }
}
