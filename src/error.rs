//! Typed errors raised by the progress engine.
//!
//! Filesystem helpers and commands work in `anyhow::Result`; anything the
//! engine itself decides (rejected input, recovery, gateway failures) is an
//! [`EngineError`] so callers can tell blocking conditions from warnings.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// No work item survived catalog filtering.
    #[error("no eligible work items: the dataset contains nothing to annotate")]
    EmptyCatalog,

    #[error("work item '{0}' appears more than once in the catalog")]
    DuplicateWorkItem(String),

    #[error("invalid source dataset: {0}")]
    InvalidSource(String),

    /// A loaded checkpoint violated the catalog invariants and was repaired.
    #[error("checkpoint was malformed; repaired {repaired} work item(s): {summary}")]
    MalformedCheckpoint { repaired: usize, summary: String },

    #[error("checkpoint at {} could not be read: {detail}", path.display())]
    CheckpointUnreadable { path: PathBuf, detail: String },

    #[error("checkpoint at {} could not be written: {detail}", path.display())]
    CheckpointWrite { path: PathBuf, detail: String },

    /// An appended record has not been checkpointed yet; retry the checkpoint.
    #[error("the previous record has not been checkpointed yet; retry the checkpoint first")]
    CheckpointPending,

    #[error("export packager unavailable: {0}")]
    ExportUnavailable(String),

    #[error("invalid task record: {0}")]
    InvalidRecord(String),

    #[error("work item '{0}' is not part of the catalog")]
    UnknownWorkItem(String),

    #[error("work item '{0}' already has a record for every sub-task")]
    WorkItemComplete(String),

    #[error("current task belongs to '{expected}', not '{requested}'")]
    CursorMismatch { expected: String, requested: String },

    #[error("all tasks are complete")]
    AllTasksComplete,
}

impl EngineError {
    /// Whether the condition must stop the operator until it is resolved.
    ///
    /// Export failures and repaired checkpoints are reported but never block.
    pub fn is_blocking(&self) -> bool {
        !matches!(
            self,
            EngineError::ExportUnavailable(_) | EngineError::MalformedCheckpoint { .. }
        )
    }
}
