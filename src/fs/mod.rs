pub mod catalog;
pub mod checkpoints;
pub mod export_state;
pub mod images;
pub mod locking;
pub mod work_dir;

pub use catalog::{read_catalog, read_dataset, write_catalog};
pub use checkpoints::FileCheckpoint;
pub use export_state::{read_export_state, write_export_state};
pub use images::{ImageMetadata, ImageReferences, ImageSource, ImageStore};
pub use work_dir::WorkDir;
