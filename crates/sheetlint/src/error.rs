//! Error types for the lint facade

use thiserror::Error;

/// Result type for lint operations
pub type LintResult<T> = std::result::Result<T, LintError>;

/// Errors raised while preparing a lint run
#[derive(Debug, Error)]
pub enum LintError {
    /// Configuration text is not valid TOML for [`LintOptions`](crate::LintOptions)
    #[error("Invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
