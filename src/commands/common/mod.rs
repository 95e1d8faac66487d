//! Helpers shared across command implementations.
//!
//! This module provides:
//! - Work directory discovery
//! - Session and read-only progress loading
//! - Rendering of tasks, recovery reports and export outcomes

use anyhow::{bail, Result};
use colored::Colorize;
use std::path::{Path, PathBuf};

use crate::checkpoints::{CheckpointStore, ExportOutcome, ExportState};
use crate::config::Config;
use crate::engine::{
    resolve_cursor, AnnotationSession, Counters, CurrentTask, Cursor, RecoveryReport,
};
use crate::export::gateway_for_work_dir;
use crate::fs::{read_catalog, read_export_state, FileCheckpoint, WorkDir};
use crate::models::constants::WORK_DIR_NAME;
use crate::models::{Discrepancy, ProgressStore, WorkCatalog};
use crate::utils::{display_path, truncate};

/// Find the project root by walking up from the current directory.
///
/// Searches the current directory and all parent directories until it finds
/// one containing a `.annotrack` directory, so commands work from any
/// subdirectory of the project.
pub fn find_project_root() -> Result<PathBuf> {
    let mut current = std::env::current_dir()?;

    loop {
        if current.join(WORK_DIR_NAME).is_dir() {
            return Ok(current);
        }

        match current.parent() {
            Some(parent) => current = parent.to_path_buf(),
            None => bail!(
                "Could not find {WORK_DIR_NAME} directory. Run 'annotrack init <dataset>' first."
            ),
        }
    }
}

/// Locate and validate the work directory.
pub fn find_work_dir() -> Result<WorkDir> {
    let work_dir = WorkDir::new(find_project_root()?)?;
    work_dir.load()?;
    Ok(work_dir)
}

/// Open an annotation session over `work_dir`, recovering prior progress.
pub fn open_session(work_dir: &WorkDir) -> Result<(AnnotationSession, RecoveryReport)> {
    let config = Config::load_with_env(&work_dir.config_path())?;
    let catalog = read_catalog(&work_dir.catalog_path())?;
    let exports = gateway_for_work_dir(work_dir, config.export.include_images)?;

    let (session, report) = AnnotationSession::open(
        catalog,
        Box::new(FileCheckpoint::for_work_dir(work_dir)),
        exports,
        config.export.batch_size,
    )?;
    print_recovery(&report, work_dir);
    Ok((session, report))
}

/// Progress as it would look after recovery, computed without writing
/// anything back to the work directory.
pub struct ProgressView {
    pub catalog: WorkCatalog,
    pub store: ProgressStore,
    pub pending_repairs: Vec<Discrepancy>,
    pub export_state: ExportState,
    pub config: Config,
}

impl ProgressView {
    pub fn load(work_dir: &WorkDir) -> Result<Self> {
        let config = Config::load_with_env(&work_dir.config_path())?;
        let catalog = read_catalog(&work_dir.catalog_path())?;
        let mut store = FileCheckpoint::for_work_dir(work_dir)
            .load()?
            .unwrap_or_default();
        let pending_repairs = store.reconcile(&catalog);
        let export_state = read_export_state(&work_dir.export_state_path())?;

        Ok(Self {
            catalog,
            store,
            pending_repairs,
            export_state,
            config,
        })
    }

    pub fn counters(&self) -> Counters {
        Counters::compute(&self.catalog, &self.store)
    }

    pub fn cursor(&self) -> Cursor {
        resolve_cursor(&self.catalog, &self.store)
    }
}

pub fn print_task(task: &CurrentTask<'_>, catalog_len: usize) {
    println!(
        "  {} {} {}",
        "Work item".bold(),
        task.work_item.id.cyan().bold(),
        format!("({}/{catalog_len})", task.position + 1).dimmed()
    );
    println!(
        "  {} {}/{}",
        "Sub-task ".bold(),
        task.subtask.index + 1,
        task.work_item.subtask_count()
    );
    println!("  {} {}", "Issue    ".bold(), truncate(&task.subtask.description, 500));
}

pub fn print_counters(counters: &Counters) {
    println!(
        "  {} {}/{} recorded ({:.1}%), {} valid, {} skipped, {} remaining",
        "Progress".bold(),
        counters.completed,
        counters.total,
        counters.percent(),
        counters.valid,
        counters.skipped(),
        counters.remaining()
    );
}

pub fn print_export(outcome: &ExportOutcome, base: &Path) {
    match outcome {
        ExportOutcome::Full { path, completed } => println!(
            "  {} Exported {completed} records to {}",
            "✓".green().bold(),
            display_path(path, base).dimmed()
        ),
        ExportOutcome::MetadataOnly {
            path,
            completed,
            primary_error,
        } => {
            println!(
                "  {} Exported {completed} records without images to {}",
                "!".yellow().bold(),
                display_path(path, base).dimmed()
            );
            println!("    {}", primary_error.yellow());
        }
        ExportOutcome::Failed { completed, error } => println!(
            "  {} Export at {completed} records failed: {}",
            "✗".red().bold(),
            error.red()
        ),
    }
}

fn print_recovery(report: &RecoveryReport, work_dir: &WorkDir) {
    let base = work_dir.project_root().unwrap_or(work_dir.root());

    if let Some(err) = report.as_error() {
        println!("  {} {err}", "!".yellow().bold());
        if let Some(archived) = &report.archived_to {
            println!(
                "    original kept at {}",
                display_path(archived, base).dimmed()
            );
        }
    }
    for discrepancy in report.discrepancies.iter().filter(|d| !d.is_repair()) {
        println!("  {} {discrepancy}", "!".yellow());
    }
    if let Some(outcome) = &report.resumed_export {
        print_export(outcome, base);
    }
}
