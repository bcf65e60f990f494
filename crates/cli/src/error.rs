//! Error types for CLI commands
//!
//! Structured errors for the command layer. Engine and configuration errors
//! are wrapped so `main` can render the whole chain with miette.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during command execution
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum CommandError {
    /// The project directory could not be resolved
    #[error("Project directory {} is not accessible", path.display())]
    ProjectNotFound {
        /// Directory given on the command line or the working directory
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A variant or layer named on the command line does not exist
    #[error("Layer '{0}' not found in the project")]
    UnknownLayer(String),

    /// Some variants could not be composed
    #[error("Build failed: {failed} out of {total} variants aborted")]
    BuildFailed {
        /// Number of variants that aborted
        failed: usize,
        /// Number of variants attempted
        total: usize,
    },

    /// Manifest or path error
    #[error(transparent)]
    Config(#[from] laminate_core::Error),

    /// Engine error
    #[error(transparent)]
    Engine(#[from] laminate_engine::Error),

    /// Interactive prompt failed
    #[error("Prompt failed: {0}")]
    Prompt(#[from] dialoguer::Error),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type alias for command operations
pub type Result<T> = std::result::Result<T, CommandError>;
