//! Error types for plugin manifest operations

use std::path::PathBuf;
use thiserror::Error;

/// Plugin manifest errors
#[derive(Debug, Error)]
pub enum PluginError {
    /// Manifest file does not exist
    #[error("Not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Version string is not `MAJOR.MINOR.PATCH[-PRERELEASE]`
    #[error("Invalid version '{0}' (expected MAJOR.MINOR.PATCH)")]
    InvalidVersion(String),

    /// Plugin name cannot be used as a directory name
    #[error("Invalid plugin name '{0}'")]
    InvalidName(String),

    /// Manifest parsed but has the wrong shape
    #[error("Invalid manifest {}: {reason}", .path.display())]
    InvalidManifest {
        /// Manifest path
        path: PathBuf,
        /// What is wrong
        reason: String,
    },

    /// Manifest is not valid JSON
    #[error("JSON error in {}: {source}", .path.display())]
    Json {
        /// Manifest path
        path: PathBuf,
        /// Parser error
        #[source]
        source: serde_json::Error,
    },

    /// Generic I/O error
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        /// File path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}

/// Convenient Result type alias
pub type Result<T> = std::result::Result<T, PluginError>;
