//! Checkpoint and export types
//!
//! The checkpoint artifact is the progress store itself; these types describe
//! what surrounds it: export triggers, the export watermark, the snapshot
//! handed to packagers and the outcome reported back to the session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::engine::counters::Counters;
use crate::models::ProgressStore;

/// Why an export fired
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ExportReason {
    /// Completed count reached a multiple of the batch size
    Batch,
    /// Every sub-task in the catalog has a record
    Final,
    /// Requested explicitly by the operator
    Manual,
}

impl std::fmt::Display for ExportReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportReason::Batch => write!(f, "batch"),
            ExportReason::Final => write!(f, "final"),
            ExportReason::Manual => write!(f, "manual"),
        }
    }
}

/// What an export actually produced
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ExportKind {
    Full,
    MetadataOnly,
}

impl std::fmt::Display for ExportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportKind::Full => write!(f, "full"),
            ExportKind::MetadataOnly => write!(f, "metadata_only"),
        }
    }
}

/// Export watermark
///
/// File location: `.annotrack/export-state.toml`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ExportState {
    /// Completed count at the last successful export of any kind
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_exported_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_kind: Option<ExportKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_artifact: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_exported_at: Option<DateTime<Utc>>,
    /// Consecutive exports where the primary packager failed
    #[serde(default)]
    pub primary_failures: u32,
}

impl ExportState {
    /// Whether a full export already exists for this completed count
    pub fn covers(&self, completed: usize) -> bool {
        self.last_exported_count == Some(completed) && self.last_kind == Some(ExportKind::Full)
    }

    /// Whether a metadata-only export already exists for this completed count
    pub fn has_metadata_for(&self, completed: usize) -> bool {
        self.last_exported_count == Some(completed)
            && self.last_kind == Some(ExportKind::MetadataOnly)
    }

    /// Record an export. A metadata-only export never downgrades a full
    /// export already recorded at the same count.
    pub fn mark(&mut self, completed: usize, kind: ExportKind, artifact: PathBuf) {
        let keeps_full = kind == ExportKind::MetadataOnly && self.covers(completed);
        self.last_exported_count = Some(completed);
        if keeps_full {
            self.last_exported_at = Some(Utc::now());
            return;
        }
        self.last_kind = Some(kind);
        self.last_artifact = Some(artifact);
        self.last_exported_at = Some(Utc::now());
        if kind == ExportKind::Full {
            self.primary_failures = 0;
        }
    }
}

/// Counts describing an export snapshot
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExportSummary {
    pub export_timestamp: DateTime<Utc>,
    pub reason: ExportReason,
    pub completed_count: usize,
    pub total_count: usize,
    pub total_work_items: usize,
    pub total_annotations: usize,
    pub valid_annotations: usize,
    pub skipped_annotations: usize,
    pub image_ids: Vec<String>,
}

/// A consistent copy of the store taken at the moment of export
#[derive(Debug, Clone)]
pub struct ExportSnapshot {
    pub store: ProgressStore,
    pub summary: ExportSummary,
}

impl ExportSnapshot {
    pub fn capture(store: &ProgressStore, counters: Counters, reason: ExportReason) -> Self {
        let summary = ExportSummary {
            export_timestamp: Utc::now(),
            reason,
            completed_count: counters.completed,
            total_count: counters.total,
            total_work_items: store.work_item_count(),
            total_annotations: store.total_records(),
            valid_annotations: counters.valid,
            skipped_annotations: counters.skipped(),
            image_ids: store.image_ids(),
        };
        Self {
            store: store.clone(),
            summary,
        }
    }

    /// Base file name for artifacts of this snapshot, without extension.
    pub fn artifact_stem(&self) -> String {
        format!(
            "annotations_{:05}_{}",
            self.summary.completed_count,
            self.summary.export_timestamp.format("%Y%m%d_%H%M%S")
        )
    }
}

/// Result of one export attempt
#[derive(Debug, Clone, PartialEq)]
pub enum ExportOutcome {
    Full {
        path: PathBuf,
        completed: usize,
    },
    /// Primary packager failed; metadata was exported instead.
    MetadataOnly {
        path: PathBuf,
        completed: usize,
        primary_error: String,
    },
    Failed {
        completed: usize,
        error: String,
    },
}

impl ExportOutcome {
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            ExportOutcome::Full { path, .. } | ExportOutcome::MetadataOnly { path, .. } => {
                Some(path)
            }
            ExportOutcome::Failed { .. } => None,
        }
    }

    pub fn is_degraded(&self) -> bool {
        !matches!(self, ExportOutcome::Full { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_watermark_marking() {
        let mut state = ExportState::default();
        assert!(!state.covers(10));

        state.mark(10, ExportKind::MetadataOnly, PathBuf::from("a.json"));
        assert!(!state.covers(10));
        assert!(state.has_metadata_for(10));

        state.primary_failures = 2;

        state.mark(10, ExportKind::Full, PathBuf::from("a.zip"));
        assert!(state.covers(10));
        assert!(!state.covers(20));
        assert_eq!(state.primary_failures, 0);
    }

    #[test]
    fn test_metadata_export_keeps_full_watermark_at_same_count() {
        let mut state = ExportState::default();
        state.mark(2, ExportKind::Full, PathBuf::from("a.zip"));
        state.mark(2, ExportKind::MetadataOnly, PathBuf::from("a.json"));

        assert!(state.covers(2));
        assert_eq!(state.last_kind, Some(ExportKind::Full));
        assert_eq!(state.last_artifact, Some(PathBuf::from("a.zip")));

        state.mark(3, ExportKind::MetadataOnly, PathBuf::from("b.json"));
        assert!(!state.covers(3));
        assert!(state.has_metadata_for(3));
    }

    #[test]
    fn test_watermark_toml_roundtrip() {
        let mut state = ExportState::default();
        state.mark(20, ExportKind::Full, PathBuf::from("exports/a.zip"));

        let text = toml::to_string_pretty(&state).unwrap();
        assert!(text.contains("last_kind = \"full\""));
        let loaded: ExportState = toml::from_str(&text).unwrap();
        assert_eq!(loaded, state);

        let empty: ExportState = toml::from_str("").unwrap();
        assert_eq!(empty, ExportState::default());
    }

    #[test]
    fn test_artifact_stem_orders_by_count() {
        let snapshot = ExportSnapshot::capture(
            &ProgressStore::new(),
            Counters {
                completed: 42,
                valid: 40,
                total: 100,
            },
            ExportReason::Batch,
        );
        assert!(snapshot.artifact_stem().starts_with("annotations_00042_"));
        assert_eq!(snapshot.summary.skipped_annotations, 2);
    }
}
