use config::{Config as ConfigBuilder, File};
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::errors::{CountError, CountResult};

/// Term counted when nothing else is configured
pub const DEFAULT_SEARCH_TERM: &str = "Go";

/// Number of workers allowed to run at once when nothing else is configured
pub const DEFAULT_CONCURRENCY: usize = 5;

/// Client-side timeout for a single HTTP request
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

/// Configuration for a counting run.
///
/// # Configuration Locations
///
/// The configuration can be loaded from multiple locations in order of precedence:
/// 1. Custom config file specified via `--config` flag
/// 2. Local `.tallyscout.yaml` in the current directory
/// 3. Global `$HOME/.config/tallyscout/config.yaml`
///
/// # Configuration Format
///
/// ```yaml
/// # Term to count (matched as raw bytes, not a regex)
/// search_term: "Go"
///
/// # Maximum number of inputs processed at once
/// concurrency: 5
///
/// # Per-request HTTP timeout in seconds
/// http_timeout_secs: 10
///
/// # Log level (trace, debug, info, warn, error)
/// log_level: "warn"
/// ```
///
/// Command-line arguments take precedence over config file values; see
/// [`CountConfig::merge_with_cli`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountConfig {
    /// The term whose occurrences are counted
    #[serde(default = "default_search_term")]
    pub search_term: String,

    /// Maximum number of workers running at the same time
    #[serde(default = "default_concurrency")]
    pub concurrency: NonZeroUsize,

    /// Timeout applied to each HTTP request
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_search_term() -> String {
    DEFAULT_SEARCH_TERM.to_string()
}

fn default_concurrency() -> NonZeroUsize {
    NonZeroUsize::new(DEFAULT_CONCURRENCY).unwrap_or(NonZeroUsize::MIN)
}

fn default_http_timeout_secs() -> u64 {
    DEFAULT_HTTP_TIMEOUT_SECS
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for CountConfig {
    fn default() -> Self {
        Self {
            search_term: default_search_term(),
            concurrency: default_concurrency(),
            http_timeout_secs: default_http_timeout_secs(),
            log_level: default_log_level(),
        }
    }
}

/// Values given explicitly on the command line. `None` means "not given".
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub search_term: Option<String>,
    pub concurrency: Option<NonZeroUsize>,
    pub http_timeout_secs: Option<u64>,
    pub log_level: Option<String>,
}

impl CountConfig {
    /// Loads configuration, layering `config_path` over the default locations
    pub fn load_from(config_path: Option<&Path>) -> CountResult<Self> {
        let mut builder = ConfigBuilder::builder();

        let config_files = [
            dirs::config_dir().map(|p| p.join("tallyscout/config.yaml")),
            Some(PathBuf::from(".tallyscout.yaml")),
        ];

        for path in config_files.iter().flatten() {
            if path.exists() {
                builder = builder.add_source(File::from(path.as_path()));
            }
        }

        // An explicitly requested file must exist
        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path).required(true));
        }

        // Validation waits until CLI overrides are merged
        Ok(builder.build()?.try_deserialize()?)
    }

    /// Merges CLI arguments with configuration file values
    pub fn merge_with_cli(mut self, cli: CliOverrides) -> Self {
        if let Some(term) = cli.search_term {
            self.search_term = term;
        }
        if let Some(concurrency) = cli.concurrency {
            self.concurrency = concurrency;
        }
        if let Some(timeout) = cli.http_timeout_secs {
            self.http_timeout_secs = timeout;
        }
        if let Some(level) = cli.log_level {
            self.log_level = level;
        }
        self
    }

    /// Rejects values no run can work with
    pub fn validate(&self) -> CountResult<()> {
        if self.search_term.is_empty() {
            return Err(CountError::config_error("search term must not be empty"));
        }
        if self.http_timeout_secs == 0 {
            return Err(CountError::config_error(
                "http_timeout_secs must be greater than zero",
            ));
        }
        Ok(())
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_load_config_file() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.yaml");
        let config_content = r#"
            search_term: "Rust"
            concurrency: 8
            http_timeout_secs: 3
            log_level: "debug"
        "#;

        let mut file = File::create(&config_path).unwrap();
        file.write_all(config_content.as_bytes()).unwrap();

        let config = CountConfig::load_from(Some(&config_path)).unwrap();
        assert_eq!(config.search_term, "Rust");
        assert_eq!(config.concurrency, NonZeroUsize::new(8).unwrap());
        assert_eq!(config.http_timeout(), Duration::from_secs(3));
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_default_values() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.yaml");
        std::fs::write(&config_path, "log_level: \"info\"\n").unwrap();

        let config = CountConfig::load_from(Some(&config_path)).unwrap();
        assert_eq!(config.search_term, "Go");
        assert_eq!(config.concurrency.get(), 5);
        assert_eq!(config.http_timeout_secs, 10);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_merge_with_cli() {
        let file_config = CountConfig {
            search_term: "TODO".to_string(),
            concurrency: NonZeroUsize::new(4).unwrap(),
            http_timeout_secs: 30,
            log_level: "info".to_string(),
        };

        let merged = file_config.merge_with_cli(CliOverrides {
            search_term: Some("FIXME".to_string()),
            concurrency: Some(NonZeroUsize::new(2).unwrap()),
            http_timeout_secs: None,
            log_level: None,
        });

        assert_eq!(merged.search_term, "FIXME"); // CLI value
        assert_eq!(merged.concurrency.get(), 2); // CLI value
        assert_eq!(merged.http_timeout_secs, 30); // File value
        assert_eq!(merged.log_level, "info"); // File value
    }

    #[test]
    fn test_empty_term_rejected() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.yaml");
        std::fs::write(&config_path, "search_term: \"\"\n").unwrap();

        let config = CountConfig::load_from(Some(&config_path)).unwrap();
        assert!(matches!(
            config.validate(),
            Err(CountError::ConfigError(_))
        ));
    }

    #[test]
    fn test_cli_override_repairs_file_values() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.yaml");
        std::fs::write(&config_path, "search_term: \"\"\nhttp_timeout_secs: 0\n").unwrap();

        let config = CountConfig::load_from(Some(&config_path))
            .unwrap()
            .merge_with_cli(CliOverrides {
                search_term: Some("Go".to_string()),
                http_timeout_secs: Some(5),
                ..CliOverrides::default()
            });
        assert!(config.validate().is_ok());
        assert_eq!(config.http_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.yaml");
        std::fs::write(&config_path, "concurrency: 0\n").unwrap();

        assert!(CountConfig::load_from(Some(&config_path)).is_err());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let config = CountConfig {
            http_timeout_secs: 0,
            ..CountConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = CountConfig::load_from(Some(Path::new("nonexistent.yaml")));
        assert!(result.is_err());
    }
}
