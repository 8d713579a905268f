//! Error types for stager

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for stager operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for stager operations
#[derive(Error, Debug)]
pub enum Error {
    /// Repository settings rejected by the transport-security policy
    #[error("Validation error: {0}")]
    Validation(String),

    /// A config or credential file is already present at the target path
    #[error("Config conflict: {} already exists", path.display())]
    ConfigConflict {
        /// Path of the existing file
        path: PathBuf,
    },

    /// Identity or proxy lookup failed
    #[error("Auth resolution error: {0}")]
    AuthResolution(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// External command exited unsuccessfully
    #[error("{command} failed (exit code {code:?}): {stderr}")]
    Process {
        /// Program and arguments as displayed in logs
        command: String,
        /// Exit code, `None` when terminated by a signal
        code: Option<i32>,
        /// Captured standard output
        stdout: String,
        /// Captured standard error
        stderr: String,
    },

    /// Unknown repository kind tag
    #[error("Unsupported repository kind: {0}")]
    UnsupportedKind(String),

    /// URL parse error
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Whether this is a conflict with an existing config or credential file
    pub fn is_conflict(&self) -> bool {
        matches!(self, Error::ConfigConflict { .. })
    }
}
