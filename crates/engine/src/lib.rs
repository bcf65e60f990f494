//! # Laminate Engine
//!
//! Layered composition of car mod variants.
//!
//! A project holds one base layer and any number of variant layers. Each
//! variant is built by copying the base layer into a fresh directory and
//! laying the variant's own tree over it:
//!
//! - **Patterns**: exclusion globs with `**` support ([`pattern`])
//! - **Documents**: ordered INI-style config documents ([`document`])
//! - **Merging**: addon fragments patched over base configs ([`merge`], [`addon`])
//! - **Trees**: recursive directory overlay with per-entry error recovery ([`tree`])
//! - **Composition**: base plus variant into one output tree ([`compose`])
//! - **Builds**: every variant of a project plus post-build fix-ups ([`builder`], [`fixup`])
//! - **System Abstraction**: filesystem operations abstracted for testing ([`system`])

pub mod addon;
pub mod builder;
pub mod compose;
pub mod document;
pub mod error;
pub mod fixup;
pub mod merge;
pub mod pattern;
pub mod report;
pub mod system;
pub mod tree;

// Re-export path types from core
pub use laminate_core::path::{AbsPath, RelPath};

pub use error::{Error, Result};

// Re-export commonly used types
pub use addon::AddonNaming;
pub use builder::{BuildOptions, BuildSummary, Builder, VariantOutcome, VariantStatus};
pub use compose::LayerComposer;
pub use document::{ConfigDocument, ParseError, Section};
pub use fixup::{FixupOutcome, FixupStatus, FixupStep, VariantFixups};
pub use merge::merge;
pub use pattern::{ExclusionSet, is_excluded};
pub use report::{EntryFailure, MergeReport};
pub use system::{RealSystem, System};
pub use tree::TreeMerger;
