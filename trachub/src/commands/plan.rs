// trachub/src/commands/plan.rs
//! `trachub plan`: builds the dry-run migration plan for a settings file.
//! License: MIT OR APACHE 2.0

use anyhow::{Context, Result};
use log::info;
use std::fs;
use std::io::{self, Write};
use std::path::Path;

use trachub_core::{plan_from_settings, MigrationSettings};

use crate::commands::{info_msg, success_msg, warn_msg};
use crate::ui::theme::ThemeMap;

pub fn run_plan(config: &Path, output: Option<&Path>, quiet: bool, theme: &ThemeMap) -> Result<()> {
    let settings = MigrationSettings::load_from_file(config)?;
    info!("Planning migration of {} into {}", settings.tickets.display(), settings.repo);

    let plan = plan_from_settings(&settings)?;
    let json = serde_json::to_string_pretty(&plan).context("Failed to serialize migration plan")?;

    match output {
        Some(path) => {
            fs::write(path, format!("{}\n", json))
                .with_context(|| format!("Failed to write migration plan to {}", path.display()))?;
            if !quiet {
                info_msg(format!("Migration plan written to {}", path.display()), theme);
            }
        }
        None => {
            let mut stdout = io::stdout().lock();
            writeln!(stdout, "{}", json)?;
            stdout.flush()?;
        }
    }

    if !quiet {
        if !plan.skipped_tickets.is_empty() {
            warn_msg(
                format!("{} tickets were skipped: {:?}", plan.skipped_tickets.len(), plan.skipped_tickets),
                theme,
            );
        }
        success_msg(
            format!(
                "Planned {} issues, {} milestones and {} labels for {}.",
                plan.issues.len(),
                plan.milestones.len(),
                plan.labels.len(),
                plan.repo
            ),
            theme,
        );
    }
    Ok(())
}
