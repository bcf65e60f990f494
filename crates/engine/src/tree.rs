//! Recursive layer merging
//!
//! [`TreeMerger`] lays one source tree over a destination tree. Each
//! directory level runs three passes:
//!
//! 1. classify the source entries, dropping excluded ones and setting addon
//!    fragments aside;
//! 2. reconcile regular entries: recurse into directories, copy plain files,
//!    merge a config file with its addon from the same level;
//! 3. apply the orphan addons whose base was not in the source level, either
//!    over the file already in the destination or as a file of their own.
//!
//! Errors below the destination root are recorded in the [`MergeReport`] and
//! the entry is skipped. Only a root that cannot be created or listed, or a
//! parse error in strict mode, is returned to the caller.

use crate::addon::AddonNaming;
use crate::document::ConfigDocument;
use crate::error::{Error, Result};
use crate::merge::merge;
use crate::pattern::ExclusionSet;
use crate::report::MergeReport;
use crate::system::{EntryKind, System};
use laminate_core::path::{AbsPath, RelPath};
use std::collections::BTreeMap;

/// Whether addon fragments are resolved at this level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Plain copy of the base layer
    Copy,
    /// Overlay of a variant layer
    Overlay,
}

/// Settings shared by every level of one merge
#[derive(Debug, Clone, Copy)]
struct Walk<'r> {
    mode: Mode,
    /// Destination root; a source directory holding it is never entered
    dest_root: &'r AbsPath,
}

/// Classification of one source directory level
#[derive(Debug, Default)]
struct MergePlan {
    directories: Vec<String>,
    files: Vec<String>,
    /// Base name to addon fragment name
    addons: BTreeMap<String, String>,
}

/// Load and parse a config document through `system`
pub(crate) fn load_document(system: &dyn System, path: &AbsPath) -> Result<ConfigDocument> {
    let bytes = system.read_file(path)?;
    let text = String::from_utf8(bytes).map_err(|source| Error::InvalidUtf8 {
        path: path.clone(),
        source,
    })?;
    ConfigDocument::parse(&text).map_err(|e| Error::ConfigParse {
        path: path.clone(),
        line: e.line,
        message: e.message,
    })
}

fn store_document(system: &dyn System, path: &AbsPath, doc: &ConfigDocument) -> Result<()> {
    system.write_file(path, doc.to_string().as_bytes())
}

/// Merges a source layer into a destination directory
pub struct TreeMerger<'a> {
    system: &'a dyn System,
    exclusions: &'a ExclusionSet,
    naming: &'a AddonNaming,
    strict: bool,
}

impl<'a> TreeMerger<'a> {
    /// Create a lenient merger; see [`TreeMerger::strict`]
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

    /// Make config parse errors abort the merge instead of skipping the file
    #[must_use]
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Overlay `source` onto `dest`, resolving addon fragments
    ///
    /// `dest` may already hold files; they are merged into or overwritten.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Structural`] if `dest` cannot be created, and the
    /// read error if `source` cannot be listed.
    pub fn merge_into(&self, source: &AbsPath, dest: &AbsPath) -> Result<MergeReport> {
        self.run(source, dest, Mode::Overlay)
    }

    /// Copy `source` into `dest` with exclusions but no addon resolution
    ///
    /// Addon fragments found here have nothing to patch and are skipped.
    ///
    /// # Errors
    ///
    /// Same as [`TreeMerger::merge_into`].
    pub fn copy_into(&self, source: &AbsPath, dest: &AbsPath) -> Result<MergeReport> {
        self.run(source, dest, Mode::Copy)
    }

    fn run(&self, source: &AbsPath, dest: &AbsPath, mode: Mode) -> Result<MergeReport> {
        if !self.system.is_dir(dest) {
            self.system
                .create_dir_all(dest)
                .map_err(|e| Error::Structural {
                    path: dest.clone(),
                    message: e.to_string(),
                })?;
        }

        let walk = Walk {
            mode,
            dest_root: dest,
        };
        let mut report = MergeReport::new();
        self.merge_level(source, dest, &RelPath::root(), walk, &mut report)?;

        tracing::debug!(
            source = %source,
            dest = %dest,
            written = report.files_written(),
            failed = report.failed(),
            "Merged layer"
        );

        Ok(report)
    }

    /// Record a recoverable error, or hand back one that must stop the run
    fn settle(&self, report: &mut MergeReport, rel: RelPath, result: Result<()>) -> Result<()> {
        match result {
            Ok(()) => Ok(()),
            Err(e) if e.is_structural() => Err(e),
            Err(e @ Error::ConfigParse { .. }) if self.strict => Err(e),
            Err(e) => {
                report.record_failure(rel, e.to_string());
                Ok(())
            }
        }
    }

    fn classify(
        &self,
        source: &AbsPath,
        rel: &RelPath,
        walk: Walk<'_>,
        report: &mut MergeReport,
    ) -> Result<MergePlan> {
        let mut plan = MergePlan::default();

        for entry in self.system.read_dir(source)? {
            let entry_rel = rel.join_name(&entry.name);

            if self.exclusions.is_excluded(&entry_rel) {
                tracing::debug!(path = %entry_rel, "Excluded");
                report.inc_excluded();
                continue;
            }

            if entry.kind == EntryKind::NonUtf8Name {
                report.record_failure(entry_rel, "file name is not valid UTF-8");
                continue;
            }

            if entry.is_dir() {
                let child = source.join_name(&entry.name);
                if walk.dest_root.as_path().starts_with(child.as_path()) {
                    report.record_failure(
                        entry_rel,
                        format!("holds the merge destination {}", walk.dest_root),
                    );
                } else {
                    plan.directories.push(entry.name);
                }
                continue;
            }

            match (walk.mode, self.naming.base_name(&entry.name)) {
                (Mode::Overlay, Some(base)) => {
                    plan.addons.insert(base, entry.name);
                }
                (Mode::Copy, Some(base)) => {
                    report.record_failure(
                        entry_rel,
                        format!("addon fragment in the base layer has nothing to patch ({base})"),
                    );
                }
                (_, None) => plan.files.push(entry.name),
            }
        }

        Ok(plan)
    }

    fn merge_level(
        &self,
        source: &AbsPath,
        dest: &AbsPath,
        rel: &RelPath,
        walk: Walk<'_>,
        report: &mut MergeReport,
    ) -> Result<()> {
        let mut plan = self.classify(source, rel, walk, report)?;

        for name in &plan.directories {
            let child_rel = rel.join_name(name);
            let result = self.merge_directory(
                &source.join_name(name),
                &dest.join_name(name),
                &child_rel,
                walk,
                report,
            );
            self.settle(report, child_rel, result)?;
        }

        for name in &plan.files {
            let file_rel = rel.join_name(name);
            let from = source.join_name(name);
            let to = dest.join_name(name);

            let result = match plan.addons.remove(name) {
                Some(addon) => self
                    .merge_pair(&from, &source.join_name(&addon), &to)
                    .map(|()| {
                        tracing::debug!(path = %file_rel, addon = %addon, "Merged config");
                        report.inc_configs_merged();
                    }),
                None => self.system.copy_file(&from, &to).map(|()| {
                    tracing::trace!(path = %file_rel, "Copied");
                    report.inc_files_copied();
                }),
            };
            self.settle(report, file_rel, result)?;
        }

        for (base, addon) in &plan.addons {
            let target_rel = rel.join_name(base);
            if self.exclusions.is_excluded(&target_rel) {
                tracing::debug!(path = %target_rel, addon = %addon, "Addon target excluded");
                report.inc_excluded();
                continue;
            }

            let result = self.apply_orphan(
                &source.join_name(addon),
                &dest.join_name(base),
                &target_rel,
                report,
            );
            self.settle(report, rel.join_name(addon), result)?;
        }

        Ok(())
    }

    fn merge_directory(
        &self,
        source: &AbsPath,
        dest: &AbsPath,
        rel: &RelPath,
        walk: Walk<'_>,
        report: &mut MergeReport,
    ) -> Result<()> {
        if !self.system.is_dir(dest) {
            self.system.create_dir_all(dest)?;
            report.inc_directories_created();
        }
        self.merge_level(source, dest, rel, walk, report)
    }

    fn merge_pair(&self, base: &AbsPath, addon: &AbsPath, dest: &AbsPath) -> Result<()> {
        let base_doc = load_document(self.system, base)?;
        let addon_doc = load_document(self.system, addon)?;
        store_document(self.system, dest, &merge(base_doc, &addon_doc))
    }

    fn apply_orphan(
        &self,
        addon: &AbsPath,
        dest: &AbsPath,
        target_rel: &RelPath,
        report: &mut MergeReport,
    ) -> Result<()> {
        let addon_doc = load_document(self.system, addon)?;

        if self.system.is_file(dest) {
            let existing = load_document(self.system, dest)?;
            store_document(self.system, dest, &merge(existing, &addon_doc))?;
            tracing::debug!(path = %target_rel, "Applied addon over existing file");
            report.inc_addons_applied();
        } else {
            store_document(self.system, dest, &merge(ConfigDocument::new(), &addon_doc))?;
            tracing::debug!(path = %target_rel, "Addon has no base, written as the file itself");
            report.inc_addons_promoted();
        }

        Ok(())
    }
}
