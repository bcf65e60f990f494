//! Configuration management for laminate
//!
//! This crate handles:
//! - Project manifest (`info.toml`) loading and validation
//! - Logging initialization

pub mod logging;
pub mod manifest;

// Re-export error types from core
pub use laminate_core::{Error, Result};

// Re-export main types
pub use manifest::{BuildConfig, InfoConfig, MANIFEST_FILE, MetadataValue, ProjectManifest};
