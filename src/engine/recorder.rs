//! Completion recorder: the one append path into the progress store.
//!
//! Completing and skipping are the same operation; a skip is just a record
//! built with [`TaskRecord::skipped`].

use tracing::debug;

use super::counters::Counters;
use crate::error::EngineError;
use crate::models::{ProgressStore, TaskRecord, WorkCatalog};

/// Append `record` to `work_item_id` and return the recomputed counters.
///
/// Callers must pass the work item of the cursor resolved immediately before
/// this call; that pairing is not re-checked here. The append is refused
/// (store untouched) when the id is unknown or the work item is already full.
pub fn record_completion(
    store: &mut ProgressStore,
    catalog: &WorkCatalog,
    work_item_id: &str,
    record: TaskRecord,
) -> Result<Counters, EngineError> {
    let item = catalog
        .get(work_item_id)
        .ok_or_else(|| EngineError::UnknownWorkItem(work_item_id.to_string()))?;

    let recorded = store.recorded_count(work_item_id);
    if recorded >= item.subtask_count() {
        return Err(EngineError::WorkItemComplete(work_item_id.to_string()));
    }

    let skipped = record.skipped;
    store.append(work_item_id, record);

    let counters = Counters::compute(catalog, store);
    debug!(
        work_item = work_item_id,
        subtask = recorded,
        skipped,
        completed = counters.completed,
        total = counters.total,
        "recorded task"
    );

    Ok(counters)
}
