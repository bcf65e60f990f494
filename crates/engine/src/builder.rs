//! Multi-variant project builds
//!
//! A project root holds `info.toml`, the base layer and one directory per
//! variant. [`Builder`] composes every variant into its own directory under
//! the build output and applies the variant fix-ups. A variant that cannot
//! be composed is reported and the remaining variants still build.

use crate::addon::AddonNaming;
use crate::compose::LayerComposer;
use crate::error::{Error, Result};
use crate::fixup::{FixupOutcome, VariantFixups};
use crate::pattern::ExclusionSet;
use crate::report::MergeReport;
use crate::system::System;
use chrono::NaiveDateTime;
use laminate_config::{MetadataValue, ProjectManifest};
use laminate_core::path::AbsPath;

/// Knobs for one build run
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// Abort a variant on config parse errors
    pub strict: bool,
    /// Only build these variants; empty means all
    pub variants: Vec<String>,
    /// Allow deleting an output directory that already holds files
    pub replace_output: bool,
}

/// How one variant ended
#[derive(Debug)]
pub enum VariantStatus {
    /// Composed, possibly with skipped entries and fix-up warnings
    Composed {
        /// What the tree merge did
        report: MergeReport,
        /// Fix-up steps in the order they ran
        fixups: Vec<FixupOutcome>,
    },
    /// Composition could not proceed
    Aborted {
        /// Why the variant was abandoned
        error: Error,
    },
}

/// Result of building one variant
#[derive(Debug)]
pub struct VariantOutcome {
    /// Variant directory name
    pub name: String,
    /// Where the variant was composed
    pub output: AbsPath,
    /// How it ended
    pub status: VariantStatus,
}

impl VariantOutcome {
    /// Whether composition was abandoned
    pub fn is_aborted(&self) -> bool {
        matches!(self.status, VariantStatus::Aborted { .. })
    }

    /// Merge report of a composed variant
    pub fn report(&self) -> Option<&MergeReport> {
        match &self.status {
            VariantStatus::Composed { report, .. } => Some(report),
            VariantStatus::Aborted { .. } => None,
        }
    }

    /// Skipped entries plus fix-up warnings
    pub fn warnings(&self) -> usize {
        match &self.status {
            VariantStatus::Composed { report, fixups } => {
                report.failed() + fixups.iter().filter(|f| f.is_warning()).count()
            }
            VariantStatus::Aborted { .. } => 0,
        }
    }
}

/// Aggregate over every variant of a run
#[derive(Debug, Default)]
pub struct BuildSummary {
    /// One outcome per selected variant, sorted by name
    pub variants: Vec<VariantOutcome>,
}

impl BuildSummary {
    /// Variants attempted
    pub fn total(&self) -> usize {
        self.variants.len()
    }

    /// Variants that aborted
    pub fn aborted(&self) -> usize {
        self.variants.iter().filter(|v| v.is_aborted()).count()
    }

    /// Variants that composed
    pub fn composed(&self) -> usize {
        self.total() - self.aborted()
    }

    /// Warnings summed over all variants
    pub fn warnings(&self) -> usize {
        self.variants.iter().map(VariantOutcome::warnings).sum()
    }

    /// Whether no variant aborted
    pub fn is_success(&self) -> bool {
        self.aborted() == 0
    }
}

/// Builds every variant of a project
pub struct Builder<'a> {
    system: &'a dyn System,
    root: AbsPath,
    manifest: &'a ProjectManifest,
    output: AbsPath,
    exclusions: ExclusionSet,
    naming: AddonNaming,
}

impl<'a> Builder<'a> {
    /// Create a builder for the project at `root`
    ///
    /// # Errors
    ///
    /// Returns an error if the configured output directory does not resolve
    /// to an absolute path, or [`Error::OutputOverlapsLayer`] if it is the
    /// project root, contains it, or lies inside a layer.
    pub fn new(
        system: &'a dyn System,
        root: AbsPath,
        manifest: &'a ProjectManifest,
    ) -> Result<Self> {
        let root = root.normalize();
        let output = AbsPath::new(manifest.output_dir(root.as_path()))?;
        let output = checked_output(&root, &manifest.build.base, &output)?;
        Ok(Self {
            system,
            root,
            manifest,
            output,
            exclusions: ExclusionSet::new(&manifest.build.ignore),
            naming: AddonNaming::new(&manifest.build.config_extensions),
        })
    }

    /// Use a different output directory than the manifest's
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutputOverlapsLayer`] under the same rules as
    /// [`Builder::new`].
    pub fn with_output(mut self, output: AbsPath) -> Result<Self> {
        self.output = checked_output(&self.root, &self.manifest.build.base, &output)?;
        Ok(self)
    }

    /// Project root
    pub fn root(&self) -> &AbsPath {
        &self.root
    }

    /// Build directory, normalized
    pub fn output_dir(&self) -> &AbsPath {
        &self.output
    }

    /// Base layer directory
    pub fn base_dir(&self) -> AbsPath {
        self.root.join_name(&self.manifest.build.base)
    }

    /// Exclusion patterns from the manifest
    pub fn exclusions(&self) -> &ExclusionSet {
        &self.exclusions
    }

    /// Check the base layer and the release metadata
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingBaseLayer`] or [`Error::MissingMetadata`].
    pub fn validate(&self) -> Result<(&'a MetadataValue, &'a MetadataValue)> {
        let base = self.base_dir();
        if !self.system.is_dir(&base) {
            return Err(Error::MissingBaseLayer { path: base });
        }

        let info = &self.manifest.info;
        let version = info
            .version
            .as_ref()
            .ok_or(Error::MissingMetadata { field: "version" })?;
        let year = info
            .year
            .as_ref()
            .ok_or(Error::MissingMetadata { field: "year" })?;

        Ok((version, year))
    }

    /// Variant directory names in sorted order
    ///
    /// Every directory of the project root except the base layer, the
    /// output directory and hidden directories.
    ///
    /// # Errors
    ///
    /// Returns an error if the project root cannot be listed.
    pub fn discover_variants(&self) -> Result<Vec<String>> {
        let base = &self.manifest.build.base;

        let variants = self
            .system
            .read_dir(&self.root)?
            .into_iter()
            .filter(|entry| entry.is_dir())
            .map(|entry| entry.name)
            .filter(|name| !name.starts_with('.'))
            .filter(|name| !name.eq_ignore_ascii_case(base))
            .filter(|name| self.root.join_name(name) != self.output)
            .collect();

        Ok(variants)
    }

    /// Whether the output directory exists and holds at least one file
    ///
    /// # Errors
    ///
    /// Returns an error if part of the output tree cannot be listed.
    pub fn output_has_files(&self) -> Result<bool> {
        if !self.system.is_dir(&self.output) {
            return Ok(false);
        }
        contains_files(self.system, &self.output)
    }

    fn prepare_output(&self, replace: bool) -> Result<()> {
        if self.system.exists(&self.output) {
            if self.output_has_files()? && !replace {
                return Err(Error::OutputNotEmpty {
                    path: self.output.clone(),
                });
            }
            self.system.remove_all(&self.output)?;
            tracing::info!(path = %self.output, "Deleted existing build directory");
        }
        self.system.create_dir_all(&self.output)
    }

    fn select_variants(&self, options: &BuildOptions) -> Result<Vec<String>> {
        let all = self.discover_variants()?;
        if options.variants.is_empty() {
            return Ok(all);
        }

        for wanted in &options.variants {
            if !all.contains(wanted) {
                return Err(Error::UnknownVariant {
                    name: wanted.clone(),
                });
            }
        }
        Ok(all
            .into_iter()
            .filter(|name| options.variants.contains(name))
            .collect())
    }

    /// Build the selected variants, stamping `compiled_at` into each
    ///
    /// # Errors
    ///
    /// Fails before any variant is touched when validation fails, a
    /// requested variant does not exist, or the output directory cannot be
    /// prepared. Per-variant failures are reported in the summary instead.
    pub fn build_at(
        &self,
        options: &BuildOptions,
        compiled_at: NaiveDateTime,
    ) -> Result<BuildSummary> {
        let (version, year) = self.validate()?;
        let variants = self.select_variants(options)?;
        self.prepare_output(options.replace_output)?;

        let base = self.base_dir();
        let composer =
            LayerComposer::new(self.system, &self.exclusions, &self.naming).strict(options.strict);
        let fixups = VariantFixups::new(self.system, version, year, compiled_at);

        let mut summary = BuildSummary::default();
        for name in variants {
            let variant_dir = self.root.join_name(&name);
            let out = self.output.join_name(&name);

            tracing::info!(variant = %name, "Composing variant");
            let status = match composer.compose(&base, &variant_dir, &out) {
                Ok(report) => VariantStatus::Composed {
                    report,
                    fixups: fixups.apply(&out, &name),
                },
                Err(error) => {
                    tracing::error!(variant = %name, error = %error, "Variant aborted");
                    VariantStatus::Aborted { error }
                }
            };

            summary.variants.push(VariantOutcome {
                name,
                output: out,
                status,
            });
        }

        Ok(summary)
    }

    /// Build the selected variants with the current local time
    ///
    /// # Errors
    ///
    /// See [`Builder::build_at`].
    pub fn build(&self, options: &BuildOptions) -> Result<BuildSummary> {
        self.build_at(options, chrono::Local::now().naive_local())
    }
}

/// Normalize `output` and make sure a build can never delete or recurse
/// into the project's layers
///
/// Outside the project root anything goes. Inside it the output must be a
/// direct child other than the base layer, or sit below a hidden directory;
/// any other top-level directory is taken for a variant.
fn checked_output(root: &AbsPath, base: &str, output: &AbsPath) -> Result<AbsPath> {
    let output = output.normalize();
    let overlaps = |layer: String| Error::OutputOverlapsLayer {
        path: output.clone(),
        layer,
    };

    if root.strip_prefix(&output).is_some() {
        return Err(overlaps(format!("the project root {root}")));
    }

    let Some(rel) = output.strip_prefix(root) else {
        return Ok(output);
    };
    let mut names = rel
        .as_path()
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned());
    let Some(top) = names.next() else {
        return Err(overlaps(format!("the project root {root}")));
    };

    if top.eq_ignore_ascii_case(base) {
        return Err(overlaps(format!("the base layer '{top}'")));
    }
    if names.next().is_some() && !top.starts_with('.') {
        return Err(overlaps(format!("the layer directory '{top}'")));
    }

    Ok(output)
}

fn contains_files(system: &dyn System, dir: &AbsPath) -> Result<bool> {
    for entry in system.read_dir(dir)? {
        if !entry.is_dir() || contains_files(system, &dir.join_name(&entry.name))? {
            return Ok(true);
        }
    }
    Ok(false)
}
