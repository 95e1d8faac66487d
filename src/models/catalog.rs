//! Work catalog: the immutable, ordered list of work items to annotate.
//!
//! The catalog is built once from the raw inconsistency dataset and never
//! mutated afterwards. Catalog order is the visiting order for the whole run.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::EngineError;
use crate::validation::validate_id;

/// One entry of the raw dataset, keyed by document id.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SourceEntry {
    #[serde(default)]
    pub has_inconsistency: bool,
    /// Inconsistency descriptions; each becomes one sub-task.
    #[serde(default)]
    pub inconsistencies: Vec<String>,
}

impl SourceEntry {
    fn eligible_descriptions(&self) -> Vec<String> {
        if !self.has_inconsistency {
            return Vec::new();
        }
        self.inconsistencies
            .iter()
            .map(|d| d.trim())
            .filter(|d| !d.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// Raw dataset in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceDataset {
    entries: Vec<(String, SourceEntry)>,
}

impl SourceDataset {
    pub fn new(entries: Vec<(String, SourceEntry)>) -> Self {
        Self { entries }
    }

    /// Parse the dataset JSON object, keeping key order as catalog order.
    pub fn from_json_str(content: &str) -> Result<Self, EngineError> {
        let root: serde_json::Map<String, serde_json::Value> = serde_json::from_str(content)
            .map_err(|e| EngineError::InvalidSource(format!("expected a JSON object: {e}")))?;

        let mut entries = Vec::with_capacity(root.len());
        for (id, value) in root {
            let entry: SourceEntry = serde_json::from_value(value)
                .map_err(|e| EngineError::InvalidSource(format!("entry '{id}': {e}")))?;
            entries.push((id, entry));
        }

        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A sub-task, identified only by its position within the work item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SubTaskSpec {
    pub index: usize,
    pub description: String,
}

/// One document-level unit of work.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WorkItem {
    pub id: String,
    pub subtasks: Vec<SubTaskSpec>,
}

impl WorkItem {
    pub fn new(id: impl Into<String>, descriptions: Vec<String>) -> Self {
        let subtasks = descriptions
            .into_iter()
            .enumerate()
            .map(|(index, description)| SubTaskSpec { index, description })
            .collect();
        Self {
            id: id.into(),
            subtasks,
        }
    }

    pub fn subtask_count(&self) -> usize {
        self.subtasks.len()
    }

    pub fn subtask(&self, index: usize) -> Option<&SubTaskSpec> {
        self.subtasks.get(index)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WorkCatalog {
    items: Vec<WorkItem>,
}

impl WorkCatalog {
    /// Build the catalog from the raw dataset.
    ///
    /// Entries flagged as consistent, or with no non-blank descriptions,
    /// contribute nothing. An empty result is rejected input.
    pub fn build(dataset: SourceDataset) -> Result<Self, EngineError> {
        let items = dataset
            .entries
            .into_iter()
            .filter_map(|(id, entry)| {
                let descriptions = entry.eligible_descriptions();
                if descriptions.is_empty() {
                    None
                } else {
                    Some(WorkItem::new(id, descriptions))
                }
            })
            .collect();

        Self::from_items(items)
    }

    /// Build from prepared work items. Sub-task indices are reassigned from
    /// position so a hand-edited catalog file cannot misalign them.
    ///
    /// Ids must pass [`validate_id`]: they become image-id prefixes and
    /// `--work-item` arguments.
    pub fn from_items(items: Vec<WorkItem>) -> Result<Self, EngineError> {
        let mut seen = HashSet::new();
        let mut normalized = Vec::with_capacity(items.len());

        for mut item in items {
            validate_id(&item.id).map_err(|e| {
                EngineError::InvalidSource(format!("work item '{}': {e}", item.id))
            })?;
            if !seen.insert(item.id.clone()) {
                return Err(EngineError::DuplicateWorkItem(item.id));
            }
            if item.subtasks.is_empty() {
                continue;
            }
            for (index, subtask) in item.subtasks.iter_mut().enumerate() {
                subtask.index = index;
            }
            normalized.push(item);
        }

        if normalized.is_empty() {
            return Err(EngineError::EmptyCatalog);
        }

        Ok(Self { items: normalized })
    }

    pub fn get(&self, id: &str) -> Option<&WorkItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Catalog position of a work item
    pub fn position(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|item| item.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &WorkItem> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn total_subtasks(&self) -> usize {
        self.items.iter().map(WorkItem::subtask_count).sum()
    }
}
