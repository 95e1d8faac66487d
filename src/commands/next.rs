//! `annotrack next`

use anyhow::Result;
use colored::Colorize;

use super::common::{find_work_dir, print_counters, print_task, ProgressView};
use crate::engine::current_task;

pub fn execute() -> Result<()> {
    let work_dir = find_work_dir()?;
    let view = ProgressView::load(&work_dir)?;
    let cursor = view.cursor();

    println!();
    match current_task(&view.catalog, &cursor) {
        Some(task) => {
            println!("{}", "Current Task".bold().blue());
            println!("{}", "─".repeat(40).dimmed());
            print_task(&task, view.catalog.len());
        }
        None => println!("{} All tasks complete", "✓".green().bold()),
    }
    print_counters(&view.counters());

    Ok(())
}
