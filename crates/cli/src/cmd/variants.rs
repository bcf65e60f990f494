//! Variants command implementation

use clap::Args;
use laminate_engine::RealSystem;
use owo_colors::OwoColorize;

use crate::command::Command;
use crate::common::RuntimeContext;
use crate::error::Result;

/// List the variants a build would produce
#[derive(Debug, Default, Args)]
pub struct VariantsCommand {}

impl Command for VariantsCommand {
    type Output = Vec<String>;

    fn execute(&self, context: &RuntimeContext) -> Result<Vec<String>> {
        let system = RealSystem;
        let builder = context.builder(&system)?;
        let variants = builder.discover_variants()?;

        if variants.is_empty() {
            println!("{}", "No variants found".dimmed());
        } else {
            for name in &variants {
                println!("  {} {}", "•".bright_blue(), name.bright_white());
            }
        }

        Ok(variants)
    }
}
