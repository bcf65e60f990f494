//! CLI command implementations

pub mod build;
pub mod ignored;
pub mod variants;
