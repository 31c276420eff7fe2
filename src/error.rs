//! Error and skip types.

use std::fmt;
use std::path::PathBuf;

/// Errors raised when a caller misuses the engine or its inputs cannot be read.
///
/// Configuration mistakes made by test authors never surface here: a missing
/// module variable becomes a [`Skipped`] outcome and a drifted mark list
/// becomes a warning.
#[derive(Debug, thiserror::Error)]
pub enum BaselineError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse manifest {}: {source}", path.display())]
    Manifest {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to parse config {}: {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid pattern {pattern}: {message}")]
    Pattern { pattern: String, message: String },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

pub type Result<T> = std::result::Result<T, BaselineError>;

/// Control outcome asking the host to skip the current test.
///
/// This is not an error: it is reported as a skip with `reason`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skipped {
    pub reason: String,
}

impl Skipped {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for Skipped {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Skipped: {}", self.reason)
    }
}
