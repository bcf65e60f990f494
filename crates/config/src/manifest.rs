//! Project manifest loading from `info.toml`
//!
//! The manifest lives in the project root, next to the base layer and the
//! variant directories:
//!
//! ```toml
//! [info]
//! project = "Touring Pack"
//! version = "1.2"
//! year = 2024
//!
//! [build]
//! ignore = ["~*", "*.tmp", "**/.git/**"]
//! base = "base"
//! output = "Build"
//! strict = false
//! config_extensions = ["ini"]
//! ```

use crate::Result;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// File name of the project manifest
pub const MANIFEST_FILE: &str = "info.toml";

/// A scalar manifest value (`version = "1.2"`, `version = 1.2`, `year = 2024`)
///
/// Kept as written so it can be stamped into JSON metadata unchanged.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    /// Integer value
    Integer(i64),
    /// Floating point value
    Float(f64),
    /// String value
    Text(String),
}

impl MetadataValue {
    /// Convert to a JSON value, preserving the original type
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Integer(i) => serde_json::Value::from(*i),
            Self::Float(f) => serde_json::Value::from(*f),
            Self::Text(s) => serde_json::Value::from(s.as_str()),
        }
    }
}

impl std::fmt::Display for MetadataValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Integer(i) => write!(f, "{i}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// `[info]` section
#[derive(Debug, Clone, Deserialize)]
pub struct InfoConfig {
    /// Human readable project name
    #[serde(default = "default_project")]
    pub project: String,

    /// Release version, stamped into every variant
    #[serde(default)]
    pub version: Option<MetadataValue>,

    /// Model year, stamped into every variant
    #[serde(default)]
    pub year: Option<MetadataValue>,
}

fn default_project() -> String {
    "Unknown Project".to_string()
}

impl Default for InfoConfig {
    fn default() -> Self {
        Self {
            project: default_project(),
            version: None,
            year: None,
        }
    }
}

/// `[build]` section
#[derive(Debug, Clone, Deserialize)]
pub struct BuildConfig {
    /// Exclusion patterns applied to every layer
    #[serde(default = "default_ignore")]
    pub ignore: Vec<String>,

    /// Directory name of the base layer
    #[serde(default = "default_base")]
    pub base: String,

    /// Build directory, relative to the project root unless absolute
    #[serde(default = "default_output")]
    pub output: PathBuf,

    /// Abort a variant when one of its config files fails to parse
    #[serde(default)]
    pub strict: bool,

    /// Extensions whose `.addon.` fragments are merged instead of copied
    #[serde(default = "default_config_extensions")]
    pub config_extensions: Vec<String>,
}

fn default_ignore() -> Vec<String> {
    vec!["~*".to_string()]
}

fn default_base() -> String {
    "base".to_string()
}

fn default_output() -> PathBuf {
    PathBuf::from("Build")
}

fn default_config_extensions() -> Vec<String> {
    vec!["ini".to_string()]
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            ignore: default_ignore(),
            base: default_base(),
            output: default_output(),
            strict: false,
            config_extensions: default_config_extensions(),
        }
    }
}

/// Project manifest loaded from `info.toml`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectManifest {
    /// Release metadata
    #[serde(default)]
    pub info: InfoConfig,

    /// Build settings
    #[serde(default)]
    pub build: BuildConfig,
}

impl ProjectManifest {
    /// Load the manifest from `<project_root>/info.toml`
    ///
    /// # Errors
    ///
    /// Returns error if the file is missing, unreadable, or not valid TOML
    pub fn load(project_root: &Path) -> Result<Self> {
        let manifest_path = project_root.join(MANIFEST_FILE);

        let content = fs::read_to_string(&manifest_path).map_err(|e| {
            laminate_core::Error::Message(format!(
                "Failed to read {}: {}",
                manifest_path.display(),
                e
            ))
        })?;

        let manifest = Self::from_toml_str(&content).map_err(|e| {
            laminate_core::Error::Message(format!(
                "Failed to parse {}: {}",
                manifest_path.display(),
                e
            ))
        })?;

        tracing::debug!(
            path = %manifest_path.display(),
            patterns = manifest.build.ignore.len(),
            "Loaded project manifest"
        );

        Ok(manifest)
    }

    /// Parse a manifest from TOML text
    ///
    /// # Errors
    ///
    /// Returns error if the TOML is malformed or has wrongly typed fields
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| laminate_core::Error::Message(e.to_string()))
    }

    /// Absolute build directory for a project root
    pub fn output_dir(&self, project_root: &Path) -> PathBuf {
        if self.build.output.is_absolute() {
            self.build.output.clone()
        } else {
            project_root.join(&self.build.output)
        }
    }
}
