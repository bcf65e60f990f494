//! Type-safe path types
//!
//! This module provides two distinct path types using the newtype pattern:
//!
//! - [`AbsPath`]: Absolute filesystem paths (layer roots, output directories)
//! - [`RelPath`]: Paths relative to a layer root
//!
//! Every engine operation takes its directories as [`AbsPath`], so nothing
//! below the command line front end depends on the process working directory.
//!
//! # Examples
//!
//! ```
//! use laminate_core::path::{AbsPath, RelPath};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let layer = AbsPath::new("/work/Source/base".into())?;
//! let lods = layer.join_name("data").join_name("lods.ini");
//!
//! let rel: RelPath = lods.strip_prefix(&layer).ok_or("outside the layer")?;
//! assert_eq!(rel.to_slash_string(), "data/lods.ini");
//! # Ok(())
//! # }
//! ```

use crate::error::{Error, Result};
use std::path::{Component, Path, PathBuf};

/// An absolute path on the filesystem
///
/// This type guarantees that the path is absolute (starts with `/` on Unix or a drive letter on Windows).
///
/// # Examples
///
/// ```
/// use laminate_core::path::AbsPath;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let abs = AbsPath::new("/work/Build".into())?;
/// assert_eq!(abs.as_path(), std::path::Path::new("/work/Build"));
///
/// assert!(AbsPath::new("relative/path".into()).is_err());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AbsPath(PathBuf);

impl AbsPath {
    /// Create a new `AbsPath` from a `PathBuf`
    ///
    /// # Errors
    ///
    /// Returns an error if the path is not absolute.
    pub fn new(path: PathBuf) -> Result<Self> {
        if path.is_absolute() {
            Ok(AbsPath(path))
        } else {
            Err(Error::PathNotAbsolute { path })
        }
    }

    /// Get the underlying `Path`
    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// Join a single file or directory name
    ///
    /// ```
    /// use laminate_core::path::AbsPath;
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let build = AbsPath::new("/work/Build".into())?;
    /// assert_eq!(build.join_name("gt3").to_string(), "/work/Build/gt3");
    /// # Ok(())
    /// # }
    /// ```
    pub fn join_name(&self, name: &str) -> Self {
        AbsPath(self.0.join(name))
    }

    /// Path of `self` below `base`, or `None` if it lies elsewhere
    ///
    /// `self == base` gives the root [`RelPath`].
    pub fn strip_prefix(&self, base: &AbsPath) -> Option<RelPath> {
        self.0
            .strip_prefix(&base.0)
            .ok()
            .map(|p| RelPath(p.to_path_buf()))
    }

    /// Resolve `.` and `..` components without touching the filesystem
    ///
    /// ```
    /// use laminate_core::path::AbsPath;
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let out = AbsPath::new("/work/mod/./gt3/../Build".into())?;
    /// assert_eq!(out.normalize().to_string(), "/work/mod/Build");
    /// # Ok(())
    /// # }
    /// ```
    pub fn normalize(&self) -> Self {
        let mut normalized = PathBuf::new();
        for component in self.0.components() {
            match component {
                Component::CurDir => {}
                Component::ParentDir => {
                    normalized.pop();
                }
                other => normalized.push(other.as_os_str()),
            }
        }
        AbsPath(normalized)
    }
}

/// A path relative to a layer root (no leading slash)
///
/// The empty path denotes the layer root itself.
///
/// # Examples
///
/// ```
/// use laminate_core::path::RelPath;
///
/// let rel = RelPath::root().join_name("data").join_name("car.ini");
/// assert_eq!(rel.to_slash_string(), "data/car.ini");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct RelPath(PathBuf);

impl RelPath {
    /// Create a new `RelPath` from a `PathBuf`
    ///
    /// # Errors
    ///
    /// Returns an error if the path is absolute.
    pub fn new(path: PathBuf) -> Result<Self> {
        if path.is_relative() {
            Ok(RelPath(path))
        } else {
            Err(Error::PathNotRelative { path })
        }
    }

    /// The layer root
    pub fn root() -> Self {
        RelPath(PathBuf::new())
    }

    /// Get the underlying `Path`
    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// Join a single file or directory name
    pub fn join_name(&self, name: &str) -> Self {
        RelPath(self.0.join(name))
    }

    /// Render with `/` separators regardless of platform
    pub fn to_slash_string(&self) -> String {
        self.0
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }
}

// Implement Display for all path types
impl std::fmt::Display for AbsPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

impl std::fmt::Display for RelPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_slash_string())
    }
}
