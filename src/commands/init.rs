//! `annotrack init <dataset>`

use anyhow::{Context, Result};
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::checkpoints::CheckpointStore;
use crate::config::Config;
use crate::fs::{read_dataset, write_catalog, FileCheckpoint, WorkDir};
use crate::models::WorkCatalog;
use crate::utils::display_path;

/// What `init` produced
#[derive(Debug)]
pub struct InitSummary {
    pub work_items: usize,
    pub subtasks: usize,
    pub skipped_entries: usize,
    pub batch_size: usize,
    /// Previous checkpoint moved aside by `--force`
    pub archived_checkpoint: Option<PathBuf>,
}

pub fn execute(dataset: PathBuf, batch_size: Option<usize>, force: bool) -> Result<()> {
    let root = std::env::current_dir()?;

    print_header();
    let summary = initialize(&root, &dataset, batch_size, force)?;
    print_summary(&root, &dataset, &summary);

    Ok(())
}

/// Build the catalog from `dataset` and create the work directory under
/// `root`. With `force` an existing work directory is reset: the old
/// checkpoint is archived to `recovery/` and the export watermark cleared.
pub fn initialize(
    root: &Path,
    dataset: &Path,
    batch_size: Option<usize>,
    force: bool,
) -> Result<InitSummary> {
    let source = read_dataset(dataset)?;
    let entries = source.len();
    let catalog = WorkCatalog::build(source)?;

    let mut config = Config::default();
    if let Some(size) = batch_size {
        config.export.batch_size = size;
    }
    config.validate()?;

    let work_dir = WorkDir::new(root)?;
    work_dir.initialize(force)?;

    let archived_checkpoint = if force {
        reset_progress(&work_dir)?
    } else {
        None
    };

    config.save(&work_dir.config_path())?;
    write_catalog(&work_dir.catalog_path(), &catalog, Some(dataset))?;

    info!(
        work_items = catalog.len(),
        subtasks = catalog.total_subtasks(),
        "work directory initialized"
    );

    Ok(InitSummary {
        work_items: catalog.len(),
        subtasks: catalog.total_subtasks(),
        skipped_entries: entries - catalog.len(),
        batch_size: config.export.batch_size,
        archived_checkpoint,
    })
}

fn reset_progress(work_dir: &WorkDir) -> Result<Option<PathBuf>> {
    let archived = FileCheckpoint::for_work_dir(work_dir).archive_current()?;
    for path in [work_dir.checkpoint_path(), work_dir.export_state_path()] {
        if path.exists() {
            fs::remove_file(&path)
                .with_context(|| format!("Failed to remove {}", path.display()))?;
        }
    }
    Ok(archived)
}

fn print_header() {
    println!();
    println!("{}", "╭──────────────────────────────────────╮".cyan());
    println!(
        "{}",
        "│       Initializing annotrack...      │".cyan().bold()
    );
    println!("{}", "╰──────────────────────────────────────╯".cyan());
}

fn print_summary(root: &Path, dataset: &Path, summary: &InitSummary) {
    println!();
    println!(
        "  {} Catalog built from {}",
        "✓".green().bold(),
        dataset.display().to_string().cyan()
    );
    println!(
        "    {} work items, {} sub-tasks ({} entries without inconsistencies skipped)",
        summary.work_items.to_string().bold(),
        summary.subtasks.to_string().bold(),
        summary.skipped_entries
    );
    println!(
        "  {} Exports every {} records",
        "✓".green().bold(),
        summary.batch_size
    );
    if let Some(archived) = &summary.archived_checkpoint {
        println!(
            "  {} Previous progress archived to {}",
            "→".yellow().bold(),
            display_path(archived, root).dimmed()
        );
    }
    println!();
    println!("{}", "═".repeat(40).dimmed());
    println!(
        "{} Run {} to see the first task",
        "✓".green().bold(),
        "annotrack next".cyan()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::read_catalog;
    use crate::models::{ProgressStore, TaskRecord};
    use tempfile::TempDir;

    fn write_dataset(dir: &Path) -> PathBuf {
        let path = dir.join("dataset.json");
        fs::write(
            &path,
            r#"{
                "P1": {"has_inconsistency": true, "inconsistencies": ["t1", "t2"]},
                "P2": {"has_inconsistency": false, "inconsistencies": []},
                "P3": {"has_inconsistency": true, "inconsistencies": ["t3"]}
            }"#,
        )
        .unwrap();
        path
    }

    #[test]
    fn test_initialize_writes_catalog_and_config() {
        let temp = TempDir::new().unwrap();
        let dataset = write_dataset(temp.path());

        let summary = initialize(temp.path(), &dataset, Some(2), false).unwrap();
        assert_eq!(summary.work_items, 2);
        assert_eq!(summary.subtasks, 3);
        assert_eq!(summary.skipped_entries, 1);

        let work_dir = WorkDir::new(temp.path()).unwrap();
        work_dir.load().unwrap();
        assert_eq!(read_catalog(&work_dir.catalog_path()).unwrap().len(), 2);
        let config = Config::load(&work_dir.config_path()).unwrap();
        assert_eq!(config.export.batch_size, 2);
    }

    #[test]
    fn test_initialize_rejects_empty_catalog() {
        let temp = TempDir::new().unwrap();
        let dataset = temp.path().join("dataset.json");
        fs::write(
            &dataset,
            r#"{"P1": {"has_inconsistency": false, "inconsistencies": ["x"]}}"#,
        )
        .unwrap();

        let err = initialize(temp.path(), &dataset, None, false).unwrap_err();
        assert!(err.to_string().contains("no eligible work items"));
        assert!(!temp.path().join(".annotrack").exists());
    }

    #[test]
    fn test_initialize_rejects_zero_batch_size() {
        let temp = TempDir::new().unwrap();
        let dataset = write_dataset(temp.path());
        assert!(initialize(temp.path(), &dataset, Some(0), false).is_err());
    }

    #[test]
    fn test_force_archives_previous_progress() {
        let temp = TempDir::new().unwrap();
        let dataset = write_dataset(temp.path());
        initialize(temp.path(), &dataset, None, false).unwrap();

        let work_dir = WorkDir::new(temp.path()).unwrap();
        let checkpoint = FileCheckpoint::for_work_dir(&work_dir);
        let mut store = ProgressStore::new();
        store.append("P1", TaskRecord::skipped());
        checkpoint.save(&store).unwrap();

        assert!(initialize(temp.path(), &dataset, None, false).is_err());
        let summary = initialize(temp.path(), &dataset, None, true).unwrap();

        let archived = summary.archived_checkpoint.unwrap();
        assert!(archived.exists());
        assert!(checkpoint.load().unwrap().is_none());
    }
}
