//! Per-run merge statistics and recovered failures

use laminate_core::path::RelPath;
use std::fmt;

/// An entry that was skipped because of an error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryFailure {
    /// Path relative to the layer root
    pub path: RelPath,
    /// Human readable reason
    pub reason: String,
}

impl fmt::Display for EntryFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.reason)
    }
}

/// Counters and failures collected while composing one variant
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    files_copied: usize,
    configs_merged: usize,
    addons_applied: usize,
    addons_promoted: usize,
    directories_created: usize,
    excluded: usize,
    failures: Vec<EntryFailure>,
}

impl MergeReport {
    /// Empty report
    pub fn new() -> Self {
        Self::default()
    }

    /// A plain file was copied
    pub fn inc_files_copied(&mut self) {
        self.files_copied += 1;
    }

    /// A base/addon pair from the same layer was merged
    pub fn inc_configs_merged(&mut self) {
        self.configs_merged += 1;
    }

    /// An orphan addon was applied over a file already in the destination
    pub fn inc_addons_applied(&mut self) {
        self.addons_applied += 1;
    }

    /// An orphan addon with no base anywhere became the file itself
    pub fn inc_addons_promoted(&mut self) {
        self.addons_promoted += 1;
    }

    /// A destination directory was created
    pub fn inc_directories_created(&mut self) {
        self.directories_created += 1;
    }

    /// An entry matched an exclusion pattern
    pub fn inc_excluded(&mut self) {
        self.excluded += 1;
    }

    /// Record a skipped entry and log it
    pub fn record_failure(&mut self, path: RelPath, reason: impl Into<String>) {
        let reason = reason.into();
        tracing::warn!(path = %path, reason = %reason, "Skipping entry");
        self.failures.push(EntryFailure { path, reason });
    }

    /// Plain files copied
    pub fn files_copied(&self) -> usize {
        self.files_copied
    }

    /// Same-level config pairs merged
    pub fn configs_merged(&self) -> usize {
        self.configs_merged
    }

    /// Orphan addons applied over existing files
    pub fn addons_applied(&self) -> usize {
        self.addons_applied
    }

    /// Orphan addons written as files of their own
    pub fn addons_promoted(&self) -> usize {
        self.addons_promoted
    }

    /// Destination directories created
    pub fn directories_created(&self) -> usize {
        self.directories_created
    }

    /// Entries dropped by exclusion patterns
    pub fn excluded(&self) -> usize {
        self.excluded
    }

    /// Skipped entries in the order they were met
    pub fn failures(&self) -> &[EntryFailure] {
        &self.failures
    }

    /// Number of skipped entries
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    /// Files written to the destination, whatever their origin
    pub fn files_written(&self) -> usize {
        self.files_copied + self.configs_merged + self.addons_applied + self.addons_promoted
    }

    /// Fold another report into this one
    pub fn absorb(&mut self, other: MergeReport) {
        self.files_copied += other.files_copied;
        self.configs_merged += other.configs_merged;
        self.addons_applied += other.addons_applied;
        self.addons_promoted += other.addons_promoted;
        self.directories_created += other.directories_created;
        self.excluded += other.excluded;
        self.failures.extend(other.failures);
    }
}
