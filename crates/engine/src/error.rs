//! Error types for laminate-engine
//!
//! This module defines all error types used throughout the engine.
//! We use `thiserror` for structured error handling with good error messages.

use laminate_core::path::AbsPath;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for laminate-engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for laminate-engine
#[derive(Error, Debug)]
pub enum Error {
    /// Error reading a file
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        /// Path involved
        path: AbsPath,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Error writing a file
    #[error("Failed to write file {path}: {source}")]
    FileWrite {
        /// Path involved
        path: AbsPath,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Error copying a file
    #[error("Failed to copy {from} to {to}: {source}")]
    FileCopy {
        /// Source path
        from: AbsPath,
        /// Destination path
        to: AbsPath,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Error renaming a file or directory
    #[error("Failed to rename {from} to {to}: {source}")]
    Rename {
        /// Source path
        from: AbsPath,
        /// Destination path
        to: AbsPath,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Error creating a directory
    #[error("Failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path involved
        path: AbsPath,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Error reading a directory
    #[error("Failed to read directory {path}: {source}")]
    DirectoryRead {
        /// Path involved
        path: AbsPath,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Error removing a directory tree
    #[error("Failed to remove {path}: {source}")]
    Remove {
        /// Path involved
        path: AbsPath,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// A config document could not be parsed
    #[error("Failed to parse {path} (line {line}): {message}")]
    ConfigParse {
        /// Path involved
        path: AbsPath,
        /// 1-based line number
        line: usize,
        /// What went wrong
        message: String,
    },

    /// Invalid UTF-8 in a text file the engine has to understand
    #[error("Invalid UTF-8 in {path}: {source}")]
    InvalidUtf8 {
        /// Path involved
        path: AbsPath,
        /// Underlying error
        #[source]
        source: std::string::FromUtf8Error,
    },

    /// Malformed JSON metadata
    #[error("Invalid JSON in {path}: {source}")]
    Json {
        /// Path involved
        path: AbsPath,
        /// Underlying error
        #[source]
        source: serde_json::Error,
    },

    /// The destination of a composition cannot be used at all
    #[error("Cannot compose into {path}: {message}")]
    Structural {
        /// Path involved
        path: AbsPath,
        /// What went wrong
        message: String,
    },

    /// Composition refuses to write over existing content
    #[error("Output directory {path} already exists and is not empty")]
    OutputNotEmpty {
        /// Path involved
        path: AbsPath,
    },

    /// The build output would overwrite or nest inside a project layer
    #[error("Build output {path} overlaps {layer}")]
    OutputOverlapsLayer {
        /// Path involved
        path: AbsPath,
        /// Description of the overlapped directory
        layer: String,
    },

    /// The project has no base layer
    #[error("Base layer not found: {path}")]
    MissingBaseLayer {
        /// Path involved
        path: AbsPath,
    },

    /// A requested variant does not exist in the project
    #[error("Unknown variant '{name}'")]
    UnknownVariant {
        /// Name as requested
        name: String,
    },

    /// The manifest lacks a field the build needs
    #[error("info.toml is missing [info].{field}")]
    MissingMetadata {
        /// Missing key under `[info]`
        field: &'static str,
    },

    /// Path is not absolute
    #[error("Path must be absolute: {}", path.display())]
    PathNotAbsolute {
        /// Path involved
        path: PathBuf,
    },

    /// Path is not relative
    #[error("Path must be relative: {}", path.display())]
    PathNotRelative {
        /// Path involved
        path: PathBuf,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error with context
    #[error("{context}: {source}")]
    Other {
        /// What was being done
        context: String,
        /// Underlying error
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

// Convert from laminate_core::Error
impl From<laminate_core::Error> for Error {
    fn from(err: laminate_core::Error) -> Self {
        match err {
            laminate_core::Error::PathNotAbsolute { path } => Error::PathNotAbsolute { path },
            laminate_core::Error::PathNotRelative { path } => Error::PathNotRelative { path },
            laminate_core::Error::Io(e) => Error::Io(e),
            laminate_core::Error::Message(_) => Error::Other {
                context: "Shared error".to_string(),
                source: Box::new(err),
            },
        }
    }
}

impl Error {
    /// Whether this error makes the whole variant unusable
    ///
    /// Everything else is recovered at the entry that produced it.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Error::Structural { .. }
                | Error::OutputNotEmpty { .. }
                | Error::OutputOverlapsLayer { .. }
                | Error::MissingBaseLayer { .. }
        )
    }
}
