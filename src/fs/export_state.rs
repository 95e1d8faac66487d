//! Export watermark persistence at `.annotrack/export-state.toml`

use anyhow::{Context, Result};
use std::path::Path;

use super::locking::{locked_read, locked_write};
use crate::checkpoints::ExportState;

/// Read the watermark. A missing file means nothing was exported yet.
pub fn read_export_state(path: &Path) -> Result<ExportState> {
    if !path.exists() {
        return Ok(ExportState::default());
    }

    let content = locked_read(path)?;
    toml::from_str(&content)
        .with_context(|| format!("Failed to parse export state: {}", path.display()))
}

pub fn write_export_state(path: &Path, state: &ExportState) -> Result<()> {
    let content = toml::to_string_pretty(state).context("Failed to serialize export state")?;
    locked_write(path, &content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkpoints::ExportKind;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_default() {
        let temp = TempDir::new().unwrap();
        let state = read_export_state(&temp.path().join("export-state.toml")).unwrap();
        assert_eq!(state.last_exported_count, None);
        assert_eq!(state.primary_failures, 0);
    }

    #[test]
    fn test_write_then_read() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("export-state.toml");

        let mut state = ExportState::default();
        state.mark(
            20,
            ExportKind::Full,
            PathBuf::from("exports/annotations_00020_20260101_120000.zip"),
        );
        write_export_state(&path, &state).unwrap();

        let loaded = read_export_state(&path).unwrap();
        assert!(loaded.covers(20));
        assert_eq!(loaded.last_kind, Some(ExportKind::Full));
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("export-state.toml");
        std::fs::write(&path, "last_exported_count = [").unwrap();

        let err = read_export_state(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse export state"));
    }
}
