//! Core types and utilities for laminate
//!
//! This is the foundation crate (Layer 0) that all other laminate crates depend on.
//! It provides:
//! - Path types (AbsPath, RelPath)
//! - Base error types
//!
//! This crate has no dependencies on other laminate crates.

pub mod error;
pub mod path;

pub use error::{Error, Result};
