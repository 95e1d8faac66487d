//! Cursor resolution: the single "what's next" answer.
//!
//! The cursor is never stored. It is recomputed from the catalog and the
//! store every time, so a reloaded checkpoint reproduces the same position.

use crate::models::{ProgressStore, SubTaskSpec, WorkCatalog, WorkItem};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cursor {
    At {
        work_item_id: String,
        subtask_index: usize,
    },
    /// Every work item is fully recorded.
    Terminal,
}

impl Cursor {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Cursor::Terminal)
    }

    pub fn work_item_id(&self) -> Option<&str> {
        match self {
            Cursor::At { work_item_id, .. } => Some(work_item_id),
            Cursor::Terminal => None,
        }
    }
}

impl std::fmt::Display for Cursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Cursor::At {
                work_item_id,
                subtask_index,
            } => write!(f, "{work_item_id}#{subtask_index}"),
            Cursor::Terminal => write!(f, "done"),
        }
    }
}

/// The first work item in catalog order with fewer records than sub-tasks,
/// positioned at its record count.
pub fn resolve_cursor(catalog: &WorkCatalog, store: &ProgressStore) -> Cursor {
    catalog
        .iter()
        .find_map(|item| {
            let recorded = store.recorded_count(&item.id);
            (recorded < item.subtask_count()).then(|| Cursor::At {
                work_item_id: item.id.clone(),
                subtask_index: recorded,
            })
        })
        .unwrap_or(Cursor::Terminal)
}

/// What the presentation layer shows for a cursor
#[derive(Debug, Clone, Copy)]
pub struct CurrentTask<'a> {
    pub work_item: &'a WorkItem,
    pub subtask: &'a SubTaskSpec,
    /// Catalog position of the work item
    pub position: usize,
}

pub fn current_task<'a>(catalog: &'a WorkCatalog, cursor: &Cursor) -> Option<CurrentTask<'a>> {
    let Cursor::At {
        work_item_id,
        subtask_index,
    } = cursor
    else {
        return None;
    };

    let position = catalog.position(work_item_id)?;
    let work_item = catalog.get(work_item_id)?;
    let subtask = work_item.subtask(*subtask_index)?;

    Some(CurrentTask {
        work_item,
        subtask,
        position,
    })
}
