//! Checkpoint and export seams.
//!
//! [`CheckpointStore`] persists the binary-stripped progress store after
//! every append. [`ExportGateway`] hands full snapshots to a [`Packager`] at
//! batch boundaries and falls back to a metadata-only packager when the
//! primary one fails.

use std::path::PathBuf;
use std::sync::Mutex;
use tracing::{debug, info, warn};

use super::policy::export_trigger;
use super::types::{ExportKind, ExportOutcome, ExportReason, ExportSnapshot, ExportState};
use crate::engine::counters::Counters;
use crate::error::EngineError;
use crate::fs::export_state::{read_export_state, write_export_state};
use crate::models::ProgressStore;

/// Durable storage for the checkpoint artifact
pub trait CheckpointStore {
    /// Load the last checkpoint, or `None` when nothing was saved yet.
    fn load(&self) -> Result<Option<ProgressStore>, EngineError>;

    /// Persist the store. Implementations must strip inline image payloads.
    fn save(&self, store: &ProgressStore) -> Result<(), EngineError>;

    /// Keep a copy of the current artifact before it is replaced by a
    /// repaired store. Returns where the copy went, if anywhere.
    fn archive_current(&self) -> Result<Option<PathBuf>, EngineError> {
        Ok(None)
    }
}

/// In-process checkpoint store, used by embedders and tests
#[derive(Debug, Default)]
pub struct MemoryCheckpoint {
    saved: Mutex<Option<ProgressStore>>,
}

impl MemoryCheckpoint {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_store(store: ProgressStore) -> Self {
        Self {
            saved: Mutex::new(Some(store)),
        }
    }

    pub fn snapshot(&self) -> Option<ProgressStore> {
        self.saved.lock().ok().and_then(|saved| saved.clone())
    }
}

impl CheckpointStore for MemoryCheckpoint {
    fn load(&self) -> Result<Option<ProgressStore>, EngineError> {
        Ok(self.snapshot())
    }

    fn save(&self, store: &ProgressStore) -> Result<(), EngineError> {
        let mut saved = self.saved.lock().map_err(|_| EngineError::CheckpointWrite {
            path: PathBuf::from("<memory>"),
            detail: "checkpoint lock poisoned".to_string(),
        })?;
        *saved = Some(store.stripped());
        Ok(())
    }
}

/// Turns an export snapshot into an artifact
pub trait Packager {
    fn name(&self) -> &str;

    fn package(&self, snapshot: &ExportSnapshot) -> Result<PathBuf, EngineError>;
}

pub struct ExportGateway {
    primary: Box<dyn Packager>,
    fallback: Option<Box<dyn Packager>>,
    state: ExportState,
    state_path: Option<PathBuf>,
}

impl ExportGateway {
    /// Gateway with an in-memory watermark
    pub fn new(primary: Box<dyn Packager>, fallback: Option<Box<dyn Packager>>) -> Self {
        Self {
            primary,
            fallback,
            state: ExportState::default(),
            state_path: None,
        }
    }

    /// Persist the watermark at `path`, loading whatever is already there.
    pub fn with_state_file(mut self, path: PathBuf) -> anyhow::Result<Self> {
        self.state = read_export_state(&path)?;
        self.state_path = Some(path);
        Ok(self)
    }

    pub fn state(&self) -> &ExportState {
        &self.state
    }

    /// The boundary reason if `counters` sits on one not yet fully exported
    pub fn due(&self, counters: Counters, batch_size: usize) -> Option<ExportReason> {
        let reason = export_trigger(counters.completed, counters.total, batch_size)?;
        if self.state.covers(counters.completed) {
            debug!(
                completed = counters.completed,
                "export boundary already covered by watermark"
            );
            return None;
        }
        Some(reason)
    }

    /// Export if the completed count is a boundary. Never mutates `store`.
    pub fn maybe_export(
        &mut self,
        store: &ProgressStore,
        counters: Counters,
        batch_size: usize,
    ) -> Option<ExportOutcome> {
        let reason = self.due(counters, batch_size)?;
        info!(
            completed = counters.completed,
            total = counters.total,
            %reason,
            "export boundary reached"
        );
        Some(self.run(ExportSnapshot::capture(store, counters, reason), false))
    }

    /// Export immediately regardless of boundaries.
    pub fn export_now(
        &mut self,
        store: &ProgressStore,
        counters: Counters,
        metadata_only: bool,
    ) -> ExportOutcome {
        let snapshot = ExportSnapshot::capture(store, counters, ExportReason::Manual);
        self.run(snapshot, metadata_only)
    }

    fn run(&mut self, snapshot: ExportSnapshot, metadata_only: bool) -> ExportOutcome {
        let completed = snapshot.summary.completed_count;

        if metadata_only {
            let packager = self.fallback.as_deref().unwrap_or(&*self.primary);
            return match packager.package(&snapshot) {
                Ok(path) => {
                    self.record(completed, ExportKind::MetadataOnly, path.clone());
                    ExportOutcome::MetadataOnly {
                        path,
                        completed,
                        primary_error: "metadata-only export requested".to_string(),
                    }
                }
                Err(e) => ExportOutcome::Failed {
                    completed,
                    error: e.to_string(),
                },
            };
        }

        let primary_error = match self.primary.package(&snapshot) {
            Ok(path) => {
                info!(
                    packager = self.primary.name(),
                    path = %path.display(),
                    "export written"
                );
                self.record(completed, ExportKind::Full, path.clone());
                return ExportOutcome::Full { path, completed };
            }
            Err(e) => e,
        };

        let primary_error = match primary_error {
            e @ EngineError::ExportUnavailable(_) => e,
            other => EngineError::ExportUnavailable(other.to_string()),
        };
        warn!(
            packager = self.primary.name(),
            error = %primary_error,
            "primary export failed; boundary will be retried on the next one"
        );

        let Some(fallback) = self.fallback.as_deref() else {
            self.state.primary_failures += 1;
            self.persist_state();
            return ExportOutcome::Failed {
                completed,
                error: primary_error.to_string(),
            };
        };

        if self.state.has_metadata_for(completed) {
            debug!(completed, "metadata-only export already exists for this count");
            return ExportOutcome::Failed {
                completed,
                error: primary_error.to_string(),
            };
        }

        match fallback.package(&snapshot) {
            Ok(path) => {
                warn!(
                    packager = fallback.name(),
                    path = %path.display(),
                    "wrote metadata-only export instead"
                );
                self.state.primary_failures += 1;
                self.record(completed, ExportKind::MetadataOnly, path.clone());
                ExportOutcome::MetadataOnly {
                    path,
                    completed,
                    primary_error: primary_error.to_string(),
                }
            }
            Err(fallback_error) => {
                warn!(
                    packager = fallback.name(),
                    error = %fallback_error,
                    "fallback export failed too"
                );
                self.state.primary_failures += 1;
                self.persist_state();
                ExportOutcome::Failed {
                    completed,
                    error: format!("{primary_error}; fallback: {fallback_error}"),
                }
            }
        }
    }

    fn record(&mut self, completed: usize, kind: ExportKind, path: PathBuf) {
        self.state.mark(completed, kind, path);
        self.persist_state();
    }

    fn persist_state(&self) {
        if let Some(path) = &self.state_path {
            if let Err(e) = write_export_state(path, &self.state) {
                warn!(error = %format!("{e:#}"), "failed to persist export watermark");
            }
        }
    }
}
