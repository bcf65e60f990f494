//! Laminate CLI library
//!
//! This library contains all the CLI logic for laminate, making it reusable
//! for testing and integration with other tools.

pub mod cmd;
pub mod command;
pub mod common;
pub mod error;
pub mod stats;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use command::Command;
use common::RuntimeContext;

/// Laminate - build game mod variants from layered directories
#[derive(Parser)]
#[command(name = "laminate")]
#[command(about = "Compose mod variants from a base layer and variant layers")]
#[command(version)]
#[command(long_about = "Compose mod variants from a base layer and variant layers

Every directory next to the base layer is a variant. Building copies the
base layer into Build/<variant>, lays the variant on top and merges
`.addon.` config fragments into the files they patch.

Features:
  • Section-level INI merging with DELETE=1 removal
  • Glob exclusion patterns from info.toml
  • Version and build time stamped into each variant")]
pub struct Cli {
    /// Path to the project directory (holds info.toml)
    #[arg(long, env = "LAMINATE_PROJECT", value_name = "DIR")]
    pub project: Option<PathBuf>,

    /// Enable verbose output (shows DEBUG level logs)
    #[arg(short, long)]
    pub verbose: bool,

    /// Write logs to a file (useful for debugging)
    #[arg(long, env = "LAMINATE_LOG_FILE", value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for laminate CLI
#[derive(Subcommand)]
pub enum Commands {
    /// Build every variant into the build directory
    Build(cmd::build::BuildCommand),

    /// List the variants of the project
    Variants(cmd::variants::VariantsCommand),

    /// Show files kept out of the build by exclusion patterns
    Ignored(cmd::ignored::IgnoredCommand),
}

fn execute_command(command: &Commands, context: &RuntimeContext) -> Result<()> {
    match command {
        Commands::Build(build_cmd) => {
            build_cmd.execute(context)?;
        }
        Commands::Variants(variants_cmd) => {
            variants_cmd.execute(context)?;
        }
        Commands::Ignored(ignored_cmd) => {
            ignored_cmd.execute(context)?;
        }
    }
    Ok(())
}

/// Run the CLI application
///
/// # Errors
///
/// Returns an error if logging cannot be set up, the project cannot be
/// loaded, or the command fails.
pub fn run(cli: Cli) -> Result<()> {
    laminate_config::logging::init(cli.verbose, cli.log_file.as_deref())
        .context("Failed to initialize logging")?;

    let context = RuntimeContext::load(cli.project.as_deref())?;

    execute_command(&cli.command, &context)
}
