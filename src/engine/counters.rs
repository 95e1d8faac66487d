use serde::{Deserialize, Serialize};

use crate::models::{ProgressStore, WorkCatalog};

/// Derived progress counters. Recomputed after every append, never stored.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Counters {
    /// Records of any kind
    pub completed: usize,
    /// Completed minus skipped
    pub valid: usize,
    /// Sub-tasks across the whole catalog
    pub total: usize,
}

impl Counters {
    pub fn compute(catalog: &WorkCatalog, store: &ProgressStore) -> Self {
        let completed = store.total_records();
        Self {
            completed,
            valid: completed - store.skipped_records(),
            total: catalog.total_subtasks(),
        }
    }

    pub fn skipped(&self) -> usize {
        self.completed - self.valid
    }

    pub fn remaining(&self) -> usize {
        self.total.saturating_sub(self.completed)
    }

    pub fn is_finished(&self) -> bool {
        self.total > 0 && self.completed >= self.total
    }

    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.completed as f64 / self.total as f64 * 100.0
    }
}
