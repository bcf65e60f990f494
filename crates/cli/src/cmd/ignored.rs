//! Ignored command implementation
//!
//! Show which files of a layer the exclusion patterns keep out of builds.

use clap::Args;
use laminate_core::path::RelPath;
use laminate_engine::{ExclusionSet, RealSystem};
use owo_colors::OwoColorize;
use std::path::Path;
use walkdir::WalkDir;

use crate::command::Command;
use crate::common::RuntimeContext;
use crate::error::{CommandError, Result};

/// List paths excluded from the build
#[derive(Debug, Default, Args)]
pub struct IgnoredCommand {
    /// Only inspect this layer (the base layer or a variant)
    #[arg(short, long, value_name = "NAME")]
    pub layer: Option<String>,
}

impl Command for IgnoredCommand {
    /// Excluded paths per layer, relative to the layer root
    type Output = Vec<(String, Vec<String>)>;

    fn execute(&self, context: &RuntimeContext) -> Result<Self::Output> {
        let system = RealSystem;
        let builder = context.builder(&system)?;

        let base = context.manifest.build.base.clone();
        let mut layers = vec![base.clone()];
        layers.extend(builder.discover_variants()?);

        if let Some(wanted) = &self.layer {
            if !layers.contains(wanted) {
                return Err(CommandError::UnknownLayer(wanted.clone()));
            }
            layers.retain(|name| name == wanted);
        }

        let mut result = Vec::with_capacity(layers.len());
        for name in layers {
            let dir = builder.root().join_name(&name);
            let excluded = collect_excluded(dir.as_path(), builder.exclusions());

            println!("{}", name.bright_white().bold());
            if excluded.is_empty() {
                println!("  {}", "(nothing excluded)".dimmed());
            }
            for path in &excluded {
                println!("  {} {}", "✗".bright_red(), path.dimmed());
            }

            result.push((name, excluded));
        }

        Ok(result)
    }
}

/// Walk `layer_root` and collect excluded paths without descending into
/// excluded directories
fn collect_excluded(layer_root: &Path, exclusions: &ExclusionSet) -> Vec<String> {
    let mut excluded = Vec::new();
    let mut walker = WalkDir::new(layer_root)
        .min_depth(1)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter();

    while let Some(entry) = walker.next() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                tracing::warn!(error = %err, "Skipping unreadable entry");
                continue;
            }
        };

        let Ok(relative) = entry.path().strip_prefix(layer_root) else {
            continue;
        };
        let Ok(relative) = RelPath::new(relative.to_path_buf()) else {
            continue;
        };

        if exclusions.is_excluded(&relative) {
            let mut display = relative.to_slash_string();
            if entry.file_type().is_dir() {
                display.push('/');
                walker.skip_current_dir();
            }
            excluded.push(display);
        }
    }

    excluded
}
