//! Addon-over-base config merging

use crate::document::{ConfigDocument, Section};

/// Merge `addon` over `base`
///
/// For each addon section, in addon order:
///
/// - a `DELETE=1` section removes the section of that name;
/// - a section the result lacks is appended with the addon's entries;
/// - otherwise each addon key overwrites or extends the existing section.
///
/// Sections only present in `base` pass through untouched. Merging the same
/// addon twice gives the same result as merging it once.
///
/// # Examples
///
/// ```
/// use laminate_engine::document::ConfigDocument;
/// use laminate_engine::merge::merge;
///
/// let base = ConfigDocument::parse("[ENGINE]\nLIMITER=7000\n[TURBO]\nBOOST=1.2\n").unwrap();
/// let addon = ConfigDocument::parse("[ENGINE]\nLIMITER=7500\n[TURBO]\nDELETE=1\n").unwrap();
///
/// let merged = merge(base, &addon);
/// assert_eq!(merged.to_string(), "[ENGINE]\nLIMITER=7500\n\n");
/// ```
pub fn merge(mut base: ConfigDocument, addon: &ConfigDocument) -> ConfigDocument {
    for section in addon.sections() {
        apply_section(&mut base, section);
    }
    base
}

fn apply_section(target: &mut ConfigDocument, section: &Section) {
    if section.is_deletion_sentinel() {
        if target.remove_section(section.name()).is_some() {
            tracing::trace!(section = section.name(), "Removed section");
        }
        return;
    }

    let existing = target.section_or_insert(section.name());
    for (key, value) in section.iter() {
        existing.set(key, value);
    }
}
