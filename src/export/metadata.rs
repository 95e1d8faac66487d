//! Degraded export: one JSON document with the summary and the annotations.

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::PathBuf;
use tracing::debug;

use super::artifact_path;
use crate::checkpoints::{ExportSnapshot, ExportSummary, Packager};
use crate::error::EngineError;
use crate::fs::locking::locked_write;
use crate::models::ProgressStore;

#[derive(Debug, Serialize)]
struct MetadataDocument<'a> {
    summary: &'a ExportSummary,
    annotations: ProgressStore,
}

pub struct MetadataPackager {
    exports_dir: PathBuf,
}

impl MetadataPackager {
    pub fn new(exports_dir: impl Into<PathBuf>) -> Self {
        Self {
            exports_dir: exports_dir.into(),
        }
    }

    fn write_document(&self, snapshot: &ExportSnapshot) -> Result<PathBuf> {
        fs::create_dir_all(&self.exports_dir).with_context(|| {
            format!(
                "Failed to create exports directory: {}",
                self.exports_dir.display()
            )
        })?;

        let document = MetadataDocument {
            summary: &snapshot.summary,
            annotations: snapshot.store.stripped(),
        };
        let json =
            serde_json::to_string_pretty(&document).context("Failed to serialize export")?;

        let path = artifact_path(&self.exports_dir, &snapshot.artifact_stem(), "json");
        locked_write(&path, &json)?;
        debug!(path = %path.display(), "metadata export written");
        Ok(path)
    }
}

impl Packager for MetadataPackager {
    fn name(&self) -> &str {
        "metadata"
    }

    fn package(&self, snapshot: &ExportSnapshot) -> Result<PathBuf, EngineError> {
        self.write_document(snapshot)
            .map_err(|e| EngineError::ExportUnavailable(format!("{e:#}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkpoints::ExportReason;
    use crate::engine::Counters;
    use crate::models::TaskRecord;
    use tempfile::TempDir;

    #[test]
    fn test_document_has_summary_and_annotations() {
        let temp = TempDir::new().unwrap();
        let mut store = ProgressStore::new();
        store.append("P1", TaskRecord::skipped());
        let counters = Counters {
            completed: 1,
            valid: 0,
            total: 3,
        };
        let snapshot = ExportSnapshot::capture(&store, counters, ExportReason::Manual);

        let path = MetadataPackager::new(temp.path())
            .package(&snapshot)
            .unwrap();
        assert_eq!(path.extension().unwrap(), "json");
        assert!(path
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("annotations_00001_"));

        let doc: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(doc["summary"]["reason"], "manual");
        assert_eq!(doc["summary"]["skipped_annotations"], 1);
        assert_eq!(doc["annotations"]["P1"][0]["skipped"], true);
    }
}
