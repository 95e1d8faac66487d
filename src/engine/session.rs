//! Annotation session: owns the catalog, the store and both gateways.
//!
//! Every submission runs append → checkpoint → (maybe export) → re-resolve.
//! A failed checkpoint leaves the record pending in memory and blocks further
//! submissions until [`AnnotationSession::flush`] succeeds, so nothing is
//! appended twice.

use std::path::PathBuf;
use tracing::{info, warn};

use super::counters::Counters;
use super::cursor::{current_task, resolve_cursor, CurrentTask, Cursor};
use super::recorder::record_completion;
use crate::checkpoints::{CheckpointStore, ExportGateway, ExportOutcome, ExportState};
use crate::error::EngineError;
use crate::models::{Discrepancy, ProgressStore, TaskRecord, WorkCatalog};

/// What happened while a session was opened
#[derive(Debug, Default)]
pub struct RecoveryReport {
    pub discrepancies: Vec<Discrepancy>,
    /// Copy of the malformed artifact, when the store had to be repaired
    pub archived_to: Option<PathBuf>,
    /// Export for a boundary the previous session reached but did not export
    pub resumed_export: Option<ExportOutcome>,
}

impl RecoveryReport {
    pub fn repaired(&self) -> usize {
        self.discrepancies.iter().filter(|d| d.is_repair()).count()
    }

    /// The repair, expressed as the engine error it corresponds to
    pub fn as_error(&self) -> Option<EngineError> {
        let repaired = self.repaired();
        if repaired == 0 {
            return None;
        }
        let summary = self
            .discrepancies
            .iter()
            .filter(|d| d.is_repair())
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        Some(EngineError::MalformedCheckpoint { repaired, summary })
    }
}

/// Result of one accepted submission
#[derive(Debug)]
pub struct Submission {
    pub counters: Counters,
    /// Cursor after the append, already re-resolved
    pub cursor: Cursor,
    pub export: Option<ExportOutcome>,
}

pub struct AnnotationSession {
    catalog: WorkCatalog,
    store: ProgressStore,
    checkpoints: Box<dyn CheckpointStore>,
    exports: ExportGateway,
    batch_size: usize,
    unsaved: bool,
}

impl AnnotationSession {
    /// Recover progress from the last checkpoint and start a session.
    ///
    /// The load is completed and reconciled against the catalog before the
    /// cursor is resolved for the first time. A `batch_size` of 0 is treated
    /// as 1.
    pub fn open(
        catalog: WorkCatalog,
        checkpoints: Box<dyn CheckpointStore>,
        exports: ExportGateway,
        batch_size: usize,
    ) -> Result<(Self, RecoveryReport), EngineError> {
        let mut store = checkpoints.load()?.unwrap_or_default();
        let discrepancies = store.reconcile(&catalog);

        for discrepancy in &discrepancies {
            warn!(
                work_item = discrepancy.work_item_id(),
                "checkpoint discrepancy: {discrepancy}"
            );
        }

        let mut report = RecoveryReport {
            discrepancies,
            ..RecoveryReport::default()
        };

        if report.repaired() > 0 {
            report.archived_to = checkpoints.archive_current()?;
            checkpoints.save(&store)?;
            if let Some(err) = report.as_error() {
                warn!(
                    archived = ?report.archived_to,
                    "repaired checkpoint saved: {err}"
                );
            }
        }

        let mut session = Self {
            catalog,
            store,
            checkpoints,
            exports,
            batch_size: batch_size.max(1),
            unsaved: false,
        };

        let counters = session.counters();
        report.resumed_export = session
            .exports
            .maybe_export(&session.store, counters, session.batch_size);

        info!(
            completed = counters.completed,
            total = counters.total,
            cursor = %session.cursor(),
            "session opened"
        );

        Ok((session, report))
    }

    pub fn catalog(&self) -> &WorkCatalog {
        &self.catalog
    }

    pub fn store(&self) -> &ProgressStore {
        &self.store
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn export_state(&self) -> &ExportState {
        self.exports.state()
    }

    /// Whether an appended record still waits for its checkpoint
    pub fn has_unsaved(&self) -> bool {
        self.unsaved
    }

    pub fn cursor(&self) -> Cursor {
        resolve_cursor(&self.catalog, &self.store)
    }

    pub fn current_task(&self) -> Option<CurrentTask<'_>> {
        current_task(&self.catalog, &self.cursor())
    }

    pub fn counters(&self) -> Counters {
        Counters::compute(&self.catalog, &self.store)
    }

    /// Record `record` as the answer to the current task.
    pub fn submit(&mut self, record: TaskRecord) -> Result<Submission, EngineError> {
        if self.unsaved {
            return Err(EngineError::CheckpointPending);
        }
        record.validate()?;

        let Cursor::At { work_item_id, .. } = self.cursor() else {
            return Err(EngineError::AllTasksComplete);
        };

        let counters = record_completion(&mut self.store, &self.catalog, &work_item_id, record)?;
        self.unsaved = true;

        let export = self.flush()?;
        let cursor = self.cursor();
        info!(
            work_item = %work_item_id,
            completed = counters.completed,
            total = counters.total,
            next = %cursor,
            "task recorded"
        );

        Ok(Submission {
            counters,
            cursor,
            export,
        })
    }

    /// Like [`submit`](Self::submit), but refuses when the current task is
    /// not in `work_item_id`. Guards front ends holding a stale cursor.
    pub fn submit_for(
        &mut self,
        work_item_id: &str,
        record: TaskRecord,
    ) -> Result<Submission, EngineError> {
        match self.cursor() {
            Cursor::At {
                work_item_id: expected,
                ..
            } if expected != work_item_id => Err(EngineError::CursorMismatch {
                expected,
                requested: work_item_id.to_string(),
            }),
            _ => self.submit(record),
        }
    }

    /// Skip the current task. Same path as a completion.
    pub fn skip(&mut self) -> Result<Submission, EngineError> {
        self.submit(TaskRecord::skipped())
    }

    /// Checkpoint a pending append, then export if it landed on a boundary.
    ///
    /// Returns `Ok(None)` when nothing was pending or no export was due.
    pub fn flush(&mut self) -> Result<Option<ExportOutcome>, EngineError> {
        if !self.unsaved {
            return Ok(None);
        }

        self.checkpoints.save(&self.store)?;
        self.unsaved = false;

        let counters = self.counters();
        Ok(self
            .exports
            .maybe_export(&self.store, counters, self.batch_size))
    }

    /// Export the current store right away.
    pub fn export_now(&mut self, metadata_only: bool) -> ExportOutcome {
        let counters = self.counters();
        self.exports.export_now(&self.store, counters, metadata_only)
    }
}
