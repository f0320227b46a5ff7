/// This module defines the error types for tallyscout.
///
/// Errors fall into two groups with very different reach:
///
/// 1. **Run-level errors** abort the whole run. The input stream could not be
///    read (`Input`) or the configuration is unusable (`ConfigError`).
///
/// 2. **Item-level errors** belong to exactly one work item. A missing file, a
///    permission problem or a failed HTTP request is reported on the error
///    stream by the worker that hit it and then dropped:
///    ```rust,ignore
///    match counter.count(&source).await {
///        Ok(n) => aggregator.add(n).await?,
///        Err(e) => reporter.report_error(&item, &e),
///    }
///    ```
///
/// Nothing item-level ever crosses into the aggregator or the dispatcher.
use std::path::PathBuf;
use thiserror::Error;

/// Result type for counting operations
pub type CountResult<T> = Result<T, CountError>;

/// Errors that can occur while counting
#[derive(Error, Debug)]
pub enum CountError {
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Failed to read input: {0}")]
    Input(#[source] std::io::Error),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Aggregator is no longer accepting messages")]
    AggregatorUnavailable,
    #[error("Concurrency slot pool was closed")]
    SlotPoolClosed,
}

impl CountError {
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound(path.into())
    }

    pub fn permission_denied(path: impl Into<PathBuf>) -> Self {
        Self::PermissionDenied(path.into())
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn input(source: std::io::Error) -> Self {
        Self::Input(source)
    }

    /// Maps an error from opening `path` onto the most specific variant
    pub fn from_open(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::file_not_found(path),
            std::io::ErrorKind::PermissionDenied => Self::permission_denied(path),
            _ => Self::Io(err),
        }
    }

    /// Whether this error ends the whole run rather than a single item
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Input(_)
                | Self::ConfigError(_)
                | Self::AggregatorUnavailable
                | Self::SlotPoolClosed
        )
    }
}

impl From<config::ConfigError> for CountError {
    fn from(err: config::ConfigError) -> Self {
        Self::ConfigError(err.to_string())
    }
}
