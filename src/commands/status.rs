//! `annotrack status`

use anyhow::Result;
use colored::Colorize;

use super::common::{find_work_dir, print_counters, ProgressView};
use crate::checkpoints::export_trigger;
use crate::engine::Cursor;
use crate::utils::{display_path, progress_bar};

pub fn execute() -> Result<()> {
    let work_dir = find_work_dir()?;
    let view = ProgressView::load(&work_dir)?;
    let base = work_dir.project_root().unwrap_or(work_dir.root());
    let counters = view.counters();

    println!();
    println!("{}", "Annotation Progress".bold().blue());
    println!("{}", "─".repeat(40).dimmed());
    println!(
        "  {} {:.1}%",
        progress_bar(counters.percent(), 30),
        counters.percent()
    );
    print_counters(&counters);
    println!(
        "  {} {} work items, batch size {}",
        "Catalog ".bold(),
        view.catalog.len(),
        view.config.export.batch_size
    );

    match view.cursor() {
        Cursor::Terminal => println!("  {} {}", "Next    ".bold(), "all tasks complete".green()),
        cursor => println!("  {} {}", "Next    ".bold(), cursor.to_string().cyan()),
    }

    println!();
    println!("{}", "Exports".bold().blue());
    println!("{}", "─".repeat(40).dimmed());
    let state = &view.export_state;
    match (state.last_exported_count, &state.last_artifact) {
        (Some(count), Some(artifact)) => {
            let kind = state.last_kind.map(|k| k.to_string()).unwrap_or_default();
            let when = state
                .last_exported_at
                .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
                .unwrap_or_default();
            println!("  {} {count} records ({kind}) {}", "Last    ".bold(), when.dimmed());
            println!("           {}", display_path(artifact, base).dimmed());
        }
        _ => println!("  {} {}", "Last    ".bold(), "none yet".dimmed()),
    }
    if state.primary_failures > 0 {
        println!(
            "  {} {} consecutive export(s) fell back to metadata only",
            "!".yellow().bold(),
            state.primary_failures
        );
    }
    if export_trigger(counters.completed, counters.total, view.config.export.batch_size)
        .is_some()
        && !state.covers(counters.completed)
    {
        println!(
            "  {} Boundary at {} records not exported yet; it runs on the next session",
            "→".yellow().bold(),
            counters.completed
        );
    }

    if !view.pending_repairs.is_empty() {
        println!();
        println!("{}", "Checkpoint".bold().yellow());
        println!("{}", "─".repeat(40).dimmed());
        for discrepancy in &view.pending_repairs {
            println!("  {} {discrepancy}", "!".yellow());
        }
    }

    Ok(())
}
