//! src/error.rs
//! ============================================================================
//! # `AppError`: Unified Error Type for Mentat
//!
//! Every component returns `Result<T, AppError>`. Only the configuration
//! variants are fatal, and only at startup; the scanner, preview and editor
//! variants are absorbed at their component boundary and shown to the user.

use std::{io, path::PathBuf};
use thiserror::Error;

/// Unified error type for all note browser operations.
#[derive(Debug, Error)]
pub enum AppError {
    /// The notes directory could not be listed.
    #[error("Cannot read notes directory {path:?}: {source}")]
    Scan {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A note could not be opened or read for preview.
    #[error("Cannot preview {path:?}: {source}")]
    Preview {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The editor executable could not be started.
    #[error("Failed to launch editor `{program}`: {source}")]
    EditorLaunch {
        program: String,
        #[source]
        source: io::Error,
    },

    /// The editor ran but exited unsuccessfully.
    #[error("Editor `{program}` exited with {status}")]
    EditorExit { program: String, status: String },

    /// Configuration could not be resolved (missing home, bad override).
    #[error("Config error: {0}")]
    Config(String),

    /// Config file I/O error with path.
    #[error("Failed to read config file {path:?}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// TOML config parsing error.
    #[error("Config parse error in {path:?}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Terminal mode switch failed.
    #[error("Terminal error while trying to {operation}: {source}")]
    Terminal {
        operation: &'static str,
        #[source]
        source: io::Error,
    },

    /// Tracing subscriber could not be installed.
    #[error("Logging setup failed: {0}")]
    Logging(String),
}

impl AppError {
    pub fn terminal(operation: &'static str, source: io::Error) -> Self {
        Self::Terminal { operation, source }
    }
}
