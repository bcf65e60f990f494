//! Composition of one variant from the base layer and its own layer

use crate::addon::AddonNaming;
use crate::error::{Error, Result};
use crate::pattern::ExclusionSet;
use crate::report::MergeReport;
use crate::system::System;
use crate::tree::TreeMerger;
use laminate_core::path::AbsPath;

/// Builds a variant tree: the base layer first, the variant layer over it
pub struct LayerComposer<'a> {
    system: &'a dyn System,
    exclusions: &'a ExclusionSet,
    naming: &'a AddonNaming,
    strict: bool,
}

impl<'a> LayerComposer<'a> {
    /// Create a composer sharing one exclusion set and naming scheme
    pub fn new(
        system: &'a dyn System,
        exclusions: &'a ExclusionSet,
        naming: &'a AddonNaming,
    ) -> Self {
        Self {
            system,
            exclusions,
            naming,
            strict: false,
        }
    }

    /// Abort the composition on config parse errors
    #[must_use]
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Compose `base` and `variant` into a fresh `out` directory
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutputNotEmpty`] if `out` already holds anything,
    /// [`Error::Structural`] if it cannot be created, and any error that
    /// prevents reading either layer root.
    pub fn compose(
        &self,
        base: &AbsPath,
        variant: &AbsPath,
        out: &AbsPath,
    ) -> Result<MergeReport> {
        if self.system.exists(out) {
            if !self.system.is_dir(out) {
                return Err(Error::Structural {
                    path: out.clone(),
                    message: "a file is in the way".to_string(),
                });
            }
            if !self.system.read_dir(out)?.is_empty() {
                return Err(Error::OutputNotEmpty { path: out.clone() });
            }
        }

        let merger = TreeMerger::new(self.system, self.exclusions, self.naming).strict(self.strict);

        tracing::debug!(base = %base, out = %out, "Copying base layer");
        let mut report = merger.copy_into(base, out)?;

        tracing::debug!(variant = %variant, out = %out, "Merging variant layer");
        report.absorb(merger.merge_into(variant, out)?);

        Ok(report)
    }
}
