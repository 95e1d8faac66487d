//! Checkpoint file I/O
//!
//! The progress store lives at `.annotrack/progress.json`. Repaired stores
//! replace it only after the previous artifact was copied to `recovery/`.

use anyhow::Context;
use chrono::Utc;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::locking::{locked_read, locked_write};
use super::work_dir::WorkDir;
use crate::checkpoints::CheckpointStore;
use crate::error::EngineError;
use crate::models::ProgressStore;

/// Checkpoint store backed by a JSON file
#[derive(Debug, Clone)]
pub struct FileCheckpoint {
    path: PathBuf,
    recovery_dir: PathBuf,
}

impl FileCheckpoint {
    pub fn new(path: impl Into<PathBuf>, recovery_dir: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            recovery_dir: recovery_dir.into(),
        }
    }

    pub fn for_work_dir(work_dir: &WorkDir) -> Self {
        Self::new(work_dir.checkpoint_path(), work_dir.recovery_dir())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CheckpointStore for FileCheckpoint {
    fn load(&self) -> Result<Option<ProgressStore>, EngineError> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no checkpoint yet");
            return Ok(None);
        }

        let unreadable = |detail: String| EngineError::CheckpointUnreadable {
            path: self.path.clone(),
            detail,
        };

        let content = locked_read(&self.path).map_err(|e| unreadable(format!("{e:#}")))?;
        let store: ProgressStore =
            serde_json::from_str(&content).map_err(|e| unreadable(e.to_string()))?;

        debug!(
            path = %self.path.display(),
            records = store.total_records(),
            "checkpoint loaded"
        );
        Ok(Some(store))
    }

    fn save(&self, store: &ProgressStore) -> Result<(), EngineError> {
        let write_error = |detail: String| EngineError::CheckpointWrite {
            path: self.path.clone(),
            detail,
        };

        let json = serde_json::to_string_pretty(&store.stripped())
            .map_err(|e| write_error(e.to_string()))?;
        locked_write(&self.path, &json).map_err(|e| write_error(format!("{e:#}")))?;

        debug!(
            path = %self.path.display(),
            records = store.total_records(),
            "checkpoint written"
        );
        Ok(())
    }

    fn archive_current(&self) -> Result<Option<PathBuf>, EngineError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let archived = archive_file(&self.path, &self.recovery_dir).map_err(|e| {
            EngineError::CheckpointWrite {
                path: self.recovery_dir.clone(),
                detail: format!("{e:#}"),
            }
        })?;
        info!(
            from = %self.path.display(),
            to = %archived.display(),
            "archived checkpoint before repair"
        );
        Ok(Some(archived))
    }
}

/// Copy `path` into `dir` under a timestamped name and return the copy.
fn archive_file(path: &Path, dir: &Path) -> anyhow::Result<PathBuf> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create recovery directory: {}", dir.display()))?;

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "checkpoint".to_string());
    let stamp = Utc::now().format("%Y%m%d_%H%M%S_%3f");
    let dest = dir.join(format!("{stem}-{stamp}.json"));

    fs::copy(path, &dest).with_context(|| {
        format!(
            "Failed to archive {} to {}",
            path.display(),
            dest.display()
        )
    })?;
    Ok(dest)
}
