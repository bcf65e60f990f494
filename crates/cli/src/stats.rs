//! Build summary output

use laminate_engine::{BuildSummary, FixupStatus, VariantOutcome, VariantStatus};
use owo_colors::OwoColorize;

/// Counts shown in a variant's breakdown line
fn breakdown(outcome: &VariantOutcome) -> Vec<String> {
    let Some(report) = outcome.report() else {
        return Vec::new();
    };

    let mut parts = Vec::new();
    if report.files_copied() > 0 {
        parts.push(format!("{} copied", report.files_copied()));
    }
    let merged = report.configs_merged() + report.addons_applied() + report.addons_promoted();
    if merged > 0 {
        parts.push(format!("{merged} merged"));
    }
    if report.excluded() > 0 {
        parts.push(format!("{} excluded", report.excluded()));
    }
    parts
}

/// Print one line per variant, its warnings, then the totals
pub fn print_summary(summary: &BuildSummary) {
    for outcome in &summary.variants {
        match &outcome.status {
            VariantStatus::Composed { report, fixups } => {
                println!(
                    "{} {} {}",
                    "●".bright_green(),
                    outcome.name.bright_white().bold(),
                    breakdown(outcome).join(", ").dimmed()
                );
                for failure in report.failures() {
                    println!("    {} {}", "skipped".yellow(), failure);
                }
                for fixup in fixups {
                    if let FixupStatus::Warning(reason) = &fixup.status {
                        println!("    {} {}: {}", "warning".yellow(), fixup.step, reason);
                    }
                }
            }
            VariantStatus::Aborted { error } => {
                println!(
                    "{} {} {}",
                    "●".bright_red(),
                    outcome.name.bright_white().bold(),
                    error.to_string().red()
                );
            }
        }
    }

    println!();

    let composed = summary.composed();
    let aborted = summary.aborted();
    let warnings = summary.warnings();

    if aborted > 0 {
        println!(
            "{} {} | {} {}",
            "●".bright_green(),
            composed.to_string().bright_green().bold(),
            "●".bright_red(),
            aborted.to_string().bright_red().bold(),
        );
    } else {
        println!(
            "{} {} built",
            "●".bright_green(),
            composed.to_string().bright_green().bold()
        );
    }

    if warnings > 0 {
        println!("  {}", format!("{warnings} warnings").yellow());
    }
}
