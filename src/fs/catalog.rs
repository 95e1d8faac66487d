//! Catalog file I/O
//!
//! `annotrack init` freezes the catalog built from the dataset into
//! `.annotrack/catalog.json` so later sessions do not depend on the dataset
//! file staying put or unchanged.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use super::locking::{locked_read, locked_write};
use crate::models::{SourceDataset, WorkCatalog, WorkItem};

#[derive(Debug, Serialize, Deserialize)]
struct CatalogFile {
    created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    source: Option<PathBuf>,
    items: Vec<WorkItem>,
}

/// Parse a source dataset file.
pub fn read_dataset(path: &Path) -> Result<SourceDataset> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read dataset: {}", path.display()))?;
    SourceDataset::from_json_str(&content)
        .with_context(|| format!("Failed to parse dataset: {}", path.display()))
}

pub fn write_catalog(path: &Path, catalog: &WorkCatalog, source: Option<&Path>) -> Result<()> {
    let file = CatalogFile {
        created_at: Utc::now(),
        source: source.map(Path::to_path_buf),
        items: catalog.iter().cloned().collect(),
    };
    let json = serde_json::to_string_pretty(&file).context("Failed to serialize catalog")?;
    locked_write(path, &json)
}

/// Read the frozen catalog, re-checking it the same way a fresh build does.
pub fn read_catalog(path: &Path) -> Result<WorkCatalog> {
    let content = locked_read(path)?;
    let file: CatalogFile = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse catalog: {}", path.display()))?;
    WorkCatalog::from_items(file.items)
        .with_context(|| format!("Invalid catalog: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const DATASET: &str = r#"{
        "paper-b": {"has_inconsistency": true, "inconsistencies": ["fig 1 vs text", "table 3"]},
        "paper-a": {"has_inconsistency": false, "inconsistencies": ["ignored"]},
        "paper-c": {"has_inconsistency": true, "inconsistencies": ["caption mismatch"]}
    }"#;

    #[test]
    fn test_dataset_to_catalog_file_and_back() {
        let temp = TempDir::new().unwrap();
        let dataset_path = temp.path().join("dataset.json");
        fs::write(&dataset_path, DATASET).unwrap();

        let catalog = WorkCatalog::build(read_dataset(&dataset_path).unwrap()).unwrap();
        let catalog_path = temp.path().join("catalog.json");
        write_catalog(&catalog_path, &catalog, Some(&dataset_path)).unwrap();

        let loaded = read_catalog(&catalog_path).unwrap();
        assert_eq!(loaded, catalog);
        let ids: Vec<&str> = loaded.iter().map(|item| item.id.as_str()).collect();
        assert_eq!(ids, vec!["paper-b", "paper-c"]);
    }

    #[test]
    fn test_missing_dataset_names_the_path() {
        let err = read_dataset(Path::new("/nonexistent/dataset.json")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/dataset.json"));
    }

    #[test]
    fn test_hand_edited_duplicate_is_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("catalog.json");
        let dup = r#"{
            "created_at": "2026-01-01T00:00:00Z",
            "items": [
                {"id": "P1", "subtasks": [{"index": 0, "description": "a"}]},
                {"id": "P1", "subtasks": [{"index": 0, "description": "b"}]}
            ]
        }"#;
        fs::write(&path, dup).unwrap();

        let err = read_catalog(&path).unwrap_err();
        assert!(format!("{err:#}").contains("more than once"));
    }
}
