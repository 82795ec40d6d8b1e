//! Error types for the houdini binary.
//!
//! The library's transition operations never fail: unresolvable targets and
//! malformed markup degrade to no-ops that are logged at debug level. Errors
//! only arise at the edges, while reading configuration, initializing the
//! log file or loading a scenario.
//!
//! # Error Hierarchy
//!
//! - [`AppError`] - Top-level error returned from `main`
//!   - [`ConfigError`] - config file exists but cannot be read or parsed
//!   - [`LoggingError`] - log directory or subscriber setup failed
//!   - [`ScenarioError`] - scenario file unreadable, malformed, or naming
//!     elements that do not exist
//!   - `serde_json::Error` - report serialization
//!   - `std::io::Error` - writing the report to stdout

use thiserror::Error;

use crate::config::ConfigError;
use crate::logging::LoggingError;
use crate::scenario::ScenarioError;

/// Top-level application error encompassing all failure modes.
///
/// Domain-specific errors convert via `From`, so `main` can use `?`
/// throughout. Every variant is fatal for the CLI run.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Logging setup failed: {0}")]
    Logging(#[from] LoggingError),

    #[error("Scenario error: {0}")]
    Scenario(#[from] ScenarioError),

    /// The report could not be rendered as JSON.
    #[error("Failed to serialize report: {0}")]
    Report(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
