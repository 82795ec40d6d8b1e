//! Tracing subscriber initialization.
//!
//! The binary writes its trace to a file so that the report on stdout stays
//! machine-readable. Follow it with `tail -f` while replaying scenarios.

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset or unparsable.
pub const DEFAULT_FILTER: &str = "info";

/// Error type for logging initialization failures.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// Failed to create log directory
    #[error("Failed to create log directory at {path:?}: {source}")]
    DirectoryCreation {
        /// The directory path that failed to be created
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Invalid log file path (no filename component)
    #[error("Invalid log file path: {0:?}")]
    InvalidPath(PathBuf),

    /// Log path has no parent directory
    #[error("Log path has no parent directory: {0:?}")]
    NoParentDirectory(PathBuf),

    /// Tracing subscriber already initialized
    #[error("Tracing subscriber already initialized")]
    SubscriberAlreadySet,
}

/// Directory and file name of a log path, as the appender wants them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogDestination {
    pub directory: PathBuf,
    pub file_name: String,
}

impl LogDestination {
    /// Split `log_path` into directory and file name.
    ///
    /// A bare file name logs into the current directory.
    pub fn from_path(log_path: &Path) -> Result<Self, LoggingError> {
        let file_name = log_path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| LoggingError::InvalidPath(log_path.to_path_buf()))?;

        let directory = match log_path.parent() {
            Some(parent) if parent.as_os_str().is_empty() => PathBuf::from("."),
            Some(parent) => parent.to_path_buf(),
            None => return Err(LoggingError::NoParentDirectory(log_path.to_path_buf())),
        };

        Ok(Self {
            directory,
            file_name: file_name.to_string(),
        })
    }
}

/// `RUST_LOG` if set and valid, otherwise [`DEFAULT_FILTER`].
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Initialize the tracing subscriber with file-based logging.
///
/// Creates the log directory if it doesn't exist.
///
/// # Errors
///
/// Fails if the path has no file name, the directory cannot be created, or a
/// global subscriber is already installed.
pub fn init(log_path: &Path) -> Result<(), LoggingError> {
    let destination = LogDestination::from_path(log_path)?;

    std::fs::create_dir_all(&destination.directory).map_err(|source| {
        LoggingError::DirectoryCreation {
            path: destination.directory.clone(),
            source,
        }
    })?;

    let file_appender =
        tracing_appender::rolling::never(&destination.directory, &destination.file_name);

    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(file_appender)
        .with_ansi(false) // No ANSI colors in log files
        .with_target(true)
        .try_init()
        .map_err(|_| LoggingError::SubscriberAlreadySet)
}

#[cfg(test)]
#[path = "logging_tests.rs"]
mod tests;
