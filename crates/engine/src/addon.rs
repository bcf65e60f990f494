//! Addon fragment naming
//!
//! A fragment that patches `car.ini` is called `car.addon.ini`. Only files
//! whose extension is one of the configured config extensions take part.

/// Infix marking an addon fragment
pub const ADDON_MARKER: &str = ".addon";

/// Maps between base config names and their addon fragment names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddonNaming {
    extensions: Vec<String>,
}

impl Default for AddonNaming {
    fn default() -> Self {
        Self::new(["ini"])
    }
}

impl AddonNaming {
    /// Create naming rules for the given extensions (with or without a dot)
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let extensions = extensions
            .into_iter()
            .map(|ext| ext.as_ref().trim_start_matches('.').to_ascii_lowercase())
            .filter(|ext| !ext.is_empty())
            .collect();
        Self { extensions }
    }

    /// Split `name` into stem and a configured extension
    fn split<'n>(&self, name: &'n str) -> Option<(&'n str, &'n str)> {
        let (stem, ext) = name.rsplit_once('.')?;
        if stem.is_empty() {
            return None;
        }
        self.extensions
            .iter()
            .any(|known| known.eq_ignore_ascii_case(ext))
            .then_some((stem, ext))
    }

    /// Base name patched by an addon fragment
    ///
    /// `car.addon.ini` gives `car.ini`; anything else gives `None`.
    pub fn base_name(&self, addon: &str) -> Option<String> {
        let (stem, ext) = self.split(addon)?;
        let base_stem = stem.strip_suffix(ADDON_MARKER)?;
        if base_stem.is_empty() {
            return None;
        }
        Some(format!("{base_stem}.{ext}"))
    }
}
