//! Build command implementation
//!
//! Compose every variant of the project into the build directory.

use clap::Args;
use laminate_core::path::AbsPath;
use laminate_engine::{BuildOptions, BuildSummary, RealSystem};
use owo_colors::OwoColorize;
use std::path::PathBuf;

use crate::command::Command;
use crate::common::RuntimeContext;
use crate::error::{CommandError, Result};

/// Compose variants into the build directory
#[derive(Debug, Default, Args)]
pub struct BuildCommand {
    /// Delete an existing build directory without asking
    #[arg(short, long)]
    pub yes: bool,

    /// Abort a variant when one of its config files fails to parse
    #[arg(long)]
    pub strict: bool,

    /// Only build this variant (repeatable)
    #[arg(long = "variant", value_name = "NAME")]
    pub variants: Vec<String>,

    /// Build directory, relative to the project unless absolute
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,
}

impl BuildCommand {
    fn confirm_replace(&self, output: &AbsPath) -> Result<bool> {
        if self.yes {
            return Ok(true);
        }

        use dialoguer::{Confirm, theme::ColorfulTheme};

        let confirmed = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(format!(
                "'{output}' already exists and contains files. Delete it and continue?"
            ))
            .default(false)
            .interact()?;
        Ok(confirmed)
    }
}

impl Command for BuildCommand {
    type Output = Option<BuildSummary>;

    fn execute(&self, context: &RuntimeContext) -> Result<Option<BuildSummary>> {
        let system = RealSystem;
        let mut builder = context.builder(&system)?;

        if let Some(output) = &self.output {
            let output = if output.is_absolute() {
                output.clone()
            } else {
                context.project_dir().as_path().join(output)
            };
            builder = builder.with_output(AbsPath::new(output)?)?;
        }

        // Fail on bad metadata before asking about deleting anything
        builder.validate()?;

        let replace_output = builder.output_has_files()?;
        if replace_output && !self.confirm_replace(builder.output_dir())? {
            println!("Build cancelled.");
            return Ok(None);
        }

        let options = BuildOptions {
            strict: self.strict || context.manifest.build.strict,
            variants: self.variants.clone(),
            replace_output,
        };

        println!(
            "Building {} {} into {}\n",
            context.manifest.info.project.bright_white().bold(),
            context
                .manifest
                .info
                .version
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default()
                .bright_cyan(),
            builder.output_dir().to_string().cyan()
        );

        let summary = builder.build(&options)?;
        crate::stats::print_summary(&summary);

        if !summary.is_success() {
            return Err(CommandError::BuildFailed {
                failed: summary.aborted(),
                total: summary.total(),
            });
        }

        Ok(Some(summary))
    }
}
