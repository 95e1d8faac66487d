//! Full export: a zip archive of annotations, image crops and metadata.

use anyhow::{Context, Result};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, warn};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::artifact_path;
use crate::checkpoints::{ExportSnapshot, ExportSummary, Packager};
use crate::error::EngineError;
use crate::fs::ImageStore;

pub const ANNOTATIONS_ENTRY: &str = "annotations.json";
pub const SUMMARY_ENTRY: &str = "export_summary.json";

/// `export_summary.json` inside the archive
#[derive(Debug, Serialize)]
struct ArchiveSummary<'a> {
    #[serde(flatten)]
    summary: &'a ExportSummary,
    total_images: usize,
    missing_image_ids: Vec<String>,
    annotations_sha256: String,
}

pub struct ZipPackager {
    images: ImageStore,
    exports_dir: PathBuf,
    include_images: bool,
}

impl ZipPackager {
    pub fn new(images: ImageStore, exports_dir: impl Into<PathBuf>) -> Self {
        Self {
            images,
            exports_dir: exports_dir.into(),
            include_images: true,
        }
    }

    pub fn include_images(mut self, include: bool) -> Self {
        self.include_images = include;
        self
    }

    fn write_archive(&self, snapshot: &ExportSnapshot) -> Result<PathBuf> {
        fs::create_dir_all(&self.exports_dir).with_context(|| {
            format!(
                "Failed to create exports directory: {}",
                self.exports_dir.display()
            )
        })?;

        let annotations = serde_json::to_vec_pretty(&snapshot.store.stripped())
            .context("Failed to serialize annotations")?;

        let mut temp = NamedTempFile::new_in(&self.exports_dir)
            .context("Failed to create temporary export file")?;
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        let (total_images, missing_image_ids) = {
            let mut zip = ZipWriter::new(temp.as_file_mut());

            zip.start_file(ANNOTATIONS_ENTRY, options)
                .context("Failed to start annotations entry")?;
            zip.write_all(&annotations)
                .context("Failed to write annotations entry")?;

            let mut added = 0;
            let mut missing = Vec::new();
            if self.include_images {
                for image_id in &snapshot.summary.image_ids {
                    if !self.images.contains(image_id) {
                        missing.push(image_id.clone());
                        continue;
                    }
                    self.add_image(&mut zip, options, image_id)?;
                    added += 1;
                }
            }
            if !missing.is_empty() {
                warn!(
                    missing = missing.len(),
                    "referenced images not found in image store"
                );
            }

            let summary = ArchiveSummary {
                summary: &snapshot.summary,
                total_images: added,
                missing_image_ids: missing.clone(),
                annotations_sha256: sha256_hex(&annotations),
            };
            zip.start_file(SUMMARY_ENTRY, options)
                .context("Failed to start summary entry")?;
            zip.write_all(
                &serde_json::to_vec_pretty(&summary).context("Failed to serialize summary")?,
            )
            .context("Failed to write summary entry")?;

            zip.finish().context("Failed to finish zip archive")?;
            (added, missing)
        };

        temp.as_file()
            .sync_all()
            .context("Failed to sync export archive")?;
        let path = artifact_path(&self.exports_dir, &snapshot.artifact_stem(), "zip");
        temp.persist(&path)
            .with_context(|| format!("Failed to move export into place: {}", path.display()))?;

        debug!(
            path = %path.display(),
            images = total_images,
            missing = missing_image_ids.len(),
            "zip export written"
        );
        Ok(path)
    }

    fn add_image<W: Write + std::io::Seek>(
        &self,
        zip: &mut ZipWriter<W>,
        options: SimpleFileOptions,
        image_id: &str,
    ) -> Result<()> {
        let bytes = self.images.load_image(image_id)?;
        zip.start_file(format!("images/{image_id}.png"), options)
            .with_context(|| format!("Failed to start image entry for {image_id}"))?;
        zip.write_all(&bytes)
            .with_context(|| format!("Failed to write image entry for {image_id}"))?;

        let metadata_path = self.images.metadata_path(image_id);
        if metadata_path.is_file() {
            let metadata = fs::read(&metadata_path).with_context(|| {
                format!("Failed to read image metadata: {}", metadata_path.display())
            })?;
            zip.start_file(format!("metadata/{image_id}.json"), options)
                .with_context(|| format!("Failed to start metadata entry for {image_id}"))?;
            zip.write_all(&metadata)
                .with_context(|| format!("Failed to write metadata entry for {image_id}"))?;
        }
        Ok(())
    }

    pub fn exports_dir(&self) -> &Path {
        &self.exports_dir
    }
}

impl Packager for ZipPackager {
    fn name(&self) -> &str {
        "zip"
    }

    fn package(&self, snapshot: &ExportSnapshot) -> Result<PathBuf, EngineError> {
        self.write_archive(snapshot)
            .map_err(|e| EngineError::ExportUnavailable(format!("{e:#}")))
    }
}

pub(crate) fn sha256_hex(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    hex::encode(hasher.finalize())
}
