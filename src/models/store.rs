//! Progress store: append-only task records per work item.
//!
//! The Nth record of a work item always answers its Nth sub-task. Positions
//! are never stored; they are the sequence length. The only mutation is
//! [`ProgressStore::append`], reached through the completion recorder.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::catalog::WorkCatalog;
use super::record::TaskRecord;

/// A store inconsistency found while reconciling a loaded checkpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Discrepancy {
    /// More records than the work item has sub-tasks; clamped.
    Overflow {
        work_item_id: String,
        recorded: usize,
        expected: usize,
    },
    /// Records for an id the catalog does not contain; dropped.
    UnknownWorkItem {
        work_item_id: String,
        recorded: usize,
    },
    /// Records for a work item while an earlier one is unfinished; kept.
    OutOfOrder {
        work_item_id: String,
        unfinished_before: String,
    },
}

impl Discrepancy {
    /// Whether reconciling changed the store for this discrepancy
    pub fn is_repair(&self) -> bool {
        !matches!(self, Discrepancy::OutOfOrder { .. })
    }

    pub fn work_item_id(&self) -> &str {
        match self {
            Discrepancy::Overflow { work_item_id, .. }
            | Discrepancy::UnknownWorkItem { work_item_id, .. }
            | Discrepancy::OutOfOrder { work_item_id, .. } => work_item_id,
        }
    }
}

impl std::fmt::Display for Discrepancy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Discrepancy::Overflow {
                work_item_id,
                recorded,
                expected,
            } => write!(
                f,
                "{work_item_id}: {recorded} records for {expected} sub-tasks, clamped to {expected}"
            ),
            Discrepancy::UnknownWorkItem {
                work_item_id,
                recorded,
            } => write!(
                f,
                "{work_item_id}: {recorded} records for a work item not in the catalog, dropped"
            ),
            Discrepancy::OutOfOrder {
                work_item_id,
                unfinished_before,
            } => write!(
                f,
                "{work_item_id}: has records while {unfinished_before} is unfinished"
            ),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct ProgressStore {
    records: BTreeMap<String, Vec<TaskRecord>>,
}

impl ProgressStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records_for(&self, work_item_id: &str) -> &[TaskRecord] {
        self.records
            .get(work_item_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn recorded_count(&self, work_item_id: &str) -> usize {
        self.records.get(work_item_id).map_or(0, Vec::len)
    }

    /// Append a record. Only the completion recorder calls this.
    pub(crate) fn append(&mut self, work_item_id: &str, record: TaskRecord) {
        self.records
            .entry(work_item_id.to_string())
            .or_default()
            .push(record);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<TaskRecord>)> {
        self.records.iter()
    }

    pub fn work_item_count(&self) -> usize {
        self.records.values().filter(|r| !r.is_empty()).count()
    }

    pub fn total_records(&self) -> usize {
        self.records.values().map(Vec::len).sum()
    }

    pub fn skipped_records(&self) -> usize {
        self.records
            .values()
            .flat_map(|records| records.iter())
            .filter(|r| r.skipped)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.total_records() == 0
    }

    /// Every image reference in the store, in first-seen order.
    pub fn image_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = Vec::new();
        for record in self.records.values().flatten() {
            for id in record.image_ids() {
                if !ids.iter().any(|known| known == id) {
                    ids.push(id.to_string());
                }
            }
        }
        ids
    }

    /// Copy of the store with every inline image payload removed.
    pub fn stripped(&self) -> Self {
        Self {
            records: self
                .records
                .iter()
                .map(|(id, records)| {
                    (
                        id.clone(),
                        records.iter().map(TaskRecord::stripped).collect(),
                    )
                })
                .collect(),
        }
    }

    /// Bring a loaded store back in line with the catalog.
    ///
    /// Overflowing sequences are truncated to the sub-task count and unknown
    /// ids are removed. Out-of-order progress is reported but left alone since
    /// each record still lines up with its own sub-task.
    pub fn reconcile(&mut self, catalog: &WorkCatalog) -> Vec<Discrepancy> {
        let mut discrepancies = Vec::new();

        let unknown: Vec<String> = self
            .records
            .keys()
            .filter(|id| catalog.get(id).is_none())
            .cloned()
            .collect();
        for id in unknown {
            if let Some(records) = self.records.remove(&id) {
                discrepancies.push(Discrepancy::UnknownWorkItem {
                    work_item_id: id,
                    recorded: records.len(),
                });
            }
        }

        let mut first_unfinished: Option<&str> = None;
        for item in catalog.iter() {
            let expected = item.subtask_count();
            if let Some(records) = self.records.get_mut(&item.id) {
                if records.len() > expected {
                    discrepancies.push(Discrepancy::Overflow {
                        work_item_id: item.id.clone(),
                        recorded: records.len(),
                        expected,
                    });
                    records.truncate(expected);
                }
                if records.is_empty() {
                    self.records.remove(&item.id);
                }
            }

            let recorded = self.recorded_count(&item.id);
            if let Some(earlier) = first_unfinished {
                if recorded > 0 {
                    discrepancies.push(Discrepancy::OutOfOrder {
                        work_item_id: item.id.clone(),
                        unfinished_before: earlier.to_string(),
                    });
                }
            }
            if recorded < expected && first_unfinished.is_none() {
                first_unfinished = Some(item.id.as_str());
            }
        }

        discrepancies
    }
}
