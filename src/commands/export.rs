//! `annotrack export [--metadata-only]`

use anyhow::{bail, Result};
use colored::Colorize;

use super::common::{find_work_dir, open_session, print_counters, print_export};
use crate::checkpoints::ExportOutcome;

pub fn execute(metadata_only: bool) -> Result<()> {
    let work_dir = find_work_dir()?;
    let (mut session, report) = open_session(&work_dir)?;

    println!();
    print_counters(&session.counters());

    // Opening the session may already have exported a missed boundary at
    // the current count.
    if satisfied_by(report.resumed_export.as_ref(), metadata_only) {
        println!(
            "  {} Nothing further to export at {} records",
            "✓".green().bold(),
            session.counters().completed
        );
        return Ok(());
    }

    let outcome = session.export_now(metadata_only);
    print_export(&outcome, work_dir.project_root().unwrap_or(work_dir.root()));

    if let ExportOutcome::Failed { error, .. } = outcome {
        bail!("Export failed: {error}");
    }
    Ok(())
}

/// Whether a catch-up export already produced what was requested.
fn satisfied_by(resumed: Option<&ExportOutcome>, metadata_only: bool) -> bool {
    match resumed {
        Some(ExportOutcome::Full { .. }) => true,
        Some(ExportOutcome::MetadataOnly { .. }) => metadata_only,
        Some(ExportOutcome::Failed { .. }) | None => false,
    }
}
