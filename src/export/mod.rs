//! Export packagers
//!
//! [`ZipPackager`] produces the full archive; [`MetadataPackager`] is the
//! fallback the gateway degrades to when the archive cannot be written.

mod archive;
mod metadata;

use std::path::{Path, PathBuf};

pub use archive::{ZipPackager, ANNOTATIONS_ENTRY, SUMMARY_ENTRY};
pub use metadata::MetadataPackager;

use crate::checkpoints::ExportGateway;
use crate::fs::{ImageStore, WorkDir};

/// Gateway over a work directory: zip primary, metadata fallback and the
/// watermark persisted next to the checkpoint.
pub fn gateway_for_work_dir(
    work_dir: &WorkDir,
    include_images: bool,
) -> anyhow::Result<ExportGateway> {
    let primary = ZipPackager::new(ImageStore::for_work_dir(work_dir), work_dir.exports_dir())
        .include_images(include_images);
    let fallback = MetadataPackager::new(work_dir.exports_dir());
    ExportGateway::new(Box::new(primary), Some(Box::new(fallback)))
        .with_state_file(work_dir.export_state_path())
}

/// `{dir}/{stem}.{ext}`, suffixed with `_1`, `_2`, ... if that name is taken.
pub(crate) fn artifact_path(dir: &Path, stem: &str, ext: &str) -> PathBuf {
    let candidate = dir.join(format!("{stem}.{ext}"));
    if !candidate.exists() {
        return candidate;
    }
    (1..)
        .map(|n| dir.join(format!("{stem}_{n}.{ext}")))
        .find(|path| !path.exists())
        .unwrap_or(candidate)
}
