pub mod catalog;
pub mod constants;
pub mod record;
pub mod store;

pub use catalog::{SourceDataset, SourceEntry, SubTaskSpec, WorkCatalog, WorkItem};
pub use record::{BoundingBox, Category, ImagePart, InconsistencyPart, TaskRecord, TextPart};
pub use store::{Discrepancy, ProgressStore};
