//! System abstraction for filesystem operations
//!
//! The tree merger and the variant fix-ups talk to the filesystem only
//! through the [`System`] trait, so tests can inject failures at a single
//! entry and observe that traversal carries on.

use crate::error::{Error, Result};
use laminate_core::path::AbsPath;
use std::fs;

/// Kind of a directory entry
///
/// Symbolic links are resolved to the kind of their target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// Regular file
    File,
    /// Directory
    Directory,
    /// Name is not valid UTF-8; the entry cannot be addressed and is
    /// listed under a lossy name so callers can report it
    NonUtf8Name,
}

/// A directory listing entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    /// File name (single path segment)
    pub name: String,
    /// Resolved kind
    pub kind: EntryKind,
}

impl DirEntry {
    /// Whether the entry is a directory
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }
}

/// Abstraction over filesystem operations
pub trait System {
    /// Read a file's contents
    fn read_file(&self, path: &AbsPath) -> Result<Vec<u8>>;

    /// Write a file's contents, replacing any existing file
    fn write_file(&self, path: &AbsPath, content: &[u8]) -> Result<()>;

    /// Copy a file, replacing any existing file at `to`
    fn copy_file(&self, from: &AbsPath, to: &AbsPath) -> Result<()>;

    /// Rename a file or directory
    fn rename(&self, from: &AbsPath, to: &AbsPath) -> Result<()>;

    /// Create a directory and all missing parents
    fn create_dir_all(&self, path: &AbsPath) -> Result<()>;

    /// List a directory, sorted by name
    fn read_dir(&self, path: &AbsPath) -> Result<Vec<DirEntry>>;

    /// Remove a directory and all its contents
    fn remove_all(&self, path: &AbsPath) -> Result<()>;

    /// Check if a path exists
    fn exists(&self, path: &AbsPath) -> bool;

    /// Check if a path is a directory
    fn is_dir(&self, path: &AbsPath) -> bool;

    /// Check if a path is a regular file
    fn is_file(&self, path: &AbsPath) -> bool;
}

/// Real filesystem implementation
#[derive(Debug, Default, Clone, Copy)]
pub struct RealSystem;

impl System for RealSystem {
    fn read_file(&self, path: &AbsPath) -> Result<Vec<u8>> {
        fs::read(path.as_path()).map_err(|e| Error::FileRead {
            path: path.clone(),
            source: e,
        })
    }

    fn write_file(&self, path: &AbsPath, content: &[u8]) -> Result<()> {
        fs::write(path.as_path(), content).map_err(|e| Error::FileWrite {
            path: path.clone(),
            source: e,
        })
    }

    fn copy_file(&self, from: &AbsPath, to: &AbsPath) -> Result<()> {
        fs::copy(from.as_path(), to.as_path())
            .map(|_| ())
            .map_err(|e| Error::FileCopy {
                from: from.clone(),
                to: to.clone(),
                source: e,
            })
    }

    fn rename(&self, from: &AbsPath, to: &AbsPath) -> Result<()> {
        fs::rename(from.as_path(), to.as_path()).map_err(|e| Error::Rename {
            from: from.clone(),
            to: to.clone(),
            source: e,
        })
    }

    fn create_dir_all(&self, path: &AbsPath) -> Result<()> {
        fs::create_dir_all(path.as_path()).map_err(|e| Error::DirectoryCreate {
            path: path.clone(),
            source: e,
        })
    }

    fn read_dir(&self, path: &AbsPath) -> Result<Vec<DirEntry>> {
        let read_err = |e| Error::DirectoryRead {
            path: path.clone(),
            source: e,
        };

        let mut entries = Vec::new();
        for entry in fs::read_dir(path.as_path()).map_err(read_err)? {
            let entry = entry.map_err(read_err)?;

            let name = match entry.file_name().into_string() {
                Ok(name) => name,
                Err(raw) => {
                    entries.push(DirEntry {
                        name: raw.to_string_lossy().into_owned(),
                        kind: EntryKind::NonUtf8Name,
                    });
                    continue;
                }
            };

            // fs::metadata follows symlinks; a dangling link is listed as a
            // file so the copy fails on that entry alone
            let kind = match fs::metadata(entry.path()) {
                Ok(metadata) if metadata.is_dir() => EntryKind::Directory,
                _ => EntryKind::File,
            };

            entries.push(DirEntry { name, kind });
        }

        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    fn remove_all(&self, path: &AbsPath) -> Result<()> {
        fs::remove_dir_all(path.as_path()).map_err(|e| Error::Remove {
            path: path.clone(),
            source: e,
        })
    }

    fn exists(&self, path: &AbsPath) -> bool {
        path.as_path().exists()
    }

    fn is_dir(&self, path: &AbsPath) -> bool {
        path.as_path().is_dir()
    }

    fn is_file(&self, path: &AbsPath) -> bool {
        path.as_path().is_file()
    }
}
