//! Common types shared across CLI commands

use crate::error::{CommandError, Result};
use laminate_config::ProjectManifest;
use laminate_core::path::AbsPath;
use laminate_engine::{Builder, System};
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// Runtime context for CLI commands
///
/// The project directory is resolved to an absolute path once, here; nothing
/// below the CLI looks at the process working directory.
#[derive(Debug, Clone)]
pub struct RuntimeContext {
    /// Shared project manifest
    pub manifest: Arc<ProjectManifest>,
    project_dir: AbsPath,
}

impl RuntimeContext {
    /// Resolve `project` (or the working directory) and load its manifest
    ///
    /// # Errors
    ///
    /// Returns an error if the directory does not exist or `info.toml` is
    /// missing or invalid.
    pub fn load(project: Option<&Path>) -> Result<Self> {
        let requested = match project {
            Some(path) => path.to_path_buf(),
            None => std::env::current_dir()?,
        };
        let canonical = fs::canonicalize(&requested).map_err(|source| {
            CommandError::ProjectNotFound {
                path: requested.clone(),
                source,
            }
        })?;
        let project_dir = AbsPath::new(canonical)?;

        let manifest = ProjectManifest::load(project_dir.as_path())?;
        tracing::debug!(project = %project_dir, name = %manifest.info.project, "Loaded project");

        Ok(Self::new(manifest, project_dir))
    }

    /// Build a context from already loaded parts
    pub fn new(manifest: ProjectManifest, project_dir: AbsPath) -> Self {
        Self {
            manifest: Arc::new(manifest),
            project_dir,
        }
    }

    /// Absolute project directory
    pub fn project_dir(&self) -> &AbsPath {
        &self.project_dir
    }

    /// Create a builder for this project
    ///
    /// # Errors
    ///
    /// Returns an error if the configured output directory is not usable.
    pub fn builder<'a>(&'a self, system: &'a dyn System) -> Result<Builder<'a>> {
        Ok(Builder::new(system, self.project_dir.clone(), &self.manifest)?)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_resolves_project() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("info.toml"),
            "[info]\nproject = \"Pack\"\n",
        )
        .unwrap();

        let context = RuntimeContext::load(Some(temp.path())).unwrap();

        assert_eq!(context.manifest.info.project, "Pack");
        assert!(context.project_dir().as_path().is_absolute());
    }

    #[test]
    fn test_load_missing_directory() {
        let temp = TempDir::new().unwrap();
        let err = RuntimeContext::load(Some(&temp.path().join("missing"))).unwrap_err();
        assert!(matches!(err, CommandError::ProjectNotFound { .. }));
    }

    #[test]
    fn test_load_missing_manifest() {
        let temp = TempDir::new().unwrap();
        let err = RuntimeContext::load(Some(temp.path())).unwrap_err();
        assert!(matches!(err, CommandError::Config(_)));
    }
}
