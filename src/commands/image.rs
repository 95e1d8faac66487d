//! `annotrack image save|cleanup`

use anyhow::{Context, Result};
use colored::Colorize;
use std::fs;
use std::path::PathBuf;

use super::common::find_work_dir;
use crate::config::Config;
use crate::fs::{ImageReferences, ImageSource, ImageStore};
use crate::models::BoundingBox;

/// Store an image crop and print the reference id to put in a record.
pub fn save(file: PathBuf, document: String, page: u32, bbox: BoundingBox) -> Result<()> {
    let work_dir = find_work_dir()?;
    let bytes =
        fs::read(&file).with_context(|| format!("Failed to read image: {}", file.display()))?;

    let store = ImageStore::for_work_dir(&work_dir);
    let image_id = store.store_image(
        &bytes,
        ImageSource {
            document_id: document,
            page,
            bbox,
        },
    )?;

    println!("{image_id}");
    Ok(())
}

/// Remove stored images past the retention window.
pub fn cleanup(days: Option<u64>) -> Result<()> {
    let work_dir = find_work_dir()?;
    let days = match days {
        Some(days) => days,
        None => Config::load_with_env(&work_dir.config_path())?.images.retention_days,
    };

    let removed = ImageStore::for_work_dir(&work_dir).cleanup_older_than(days)?;
    println!(
        "{} Removed {removed} image(s) older than {days} day(s)",
        "✓".green().bold()
    );
    Ok(())
}
