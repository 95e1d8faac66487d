//! Image reference store at `.annotrack/images/`
//!
//! Records carry image ids, not pixels. Each id names a `{id}.png` crop and
//! a `{id}.json` metadata file written here when the crop was captured.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tracing::{debug, info};
use uuid::Uuid;

use super::work_dir::WorkDir;
use crate::models::constants::IMAGE_ID_SUFFIX_LEN;
use crate::models::BoundingBox;
use crate::validation::validate_id;

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// Where a crop came from
#[derive(Debug, Clone, PartialEq)]
pub struct ImageSource {
    pub document_id: String,
    pub page: u32,
    pub bbox: BoundingBox,
}

/// Metadata sidecar stored next to every image
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImageMetadata {
    pub image_id: String,
    pub document_id: String,
    pub page: u32,
    pub bbox: BoundingBox,
    pub saved_at: DateTime<Utc>,
    pub file_path: PathBuf,
}

/// Collaborator that turns image bytes into a reference id
pub trait ImageReferences {
    fn store_image(&self, bytes: &[u8], source: ImageSource) -> Result<String>;
}

#[derive(Debug, Clone)]
pub struct ImageStore {
    dir: PathBuf,
}

impl ImageStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn for_work_dir(work_dir: &WorkDir) -> Self {
        Self::new(work_dir.images_dir())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn image_path(&self, image_id: &str) -> PathBuf {
        self.dir.join(format!("{image_id}.png"))
    }

    pub fn metadata_path(&self, image_id: &str) -> PathBuf {
        self.dir.join(format!("{image_id}.json"))
    }

    /// Whether `image_id` is well-formed and its crop is on disk.
    pub fn contains(&self, image_id: &str) -> bool {
        validate_id(image_id).is_ok() && self.image_path(image_id).is_file()
    }

    pub fn load_image(&self, image_id: &str) -> Result<Vec<u8>> {
        validate_id(image_id)?;
        let path = self.image_path(image_id);
        fs::read(&path).with_context(|| format!("Failed to read image: {}", path.display()))
    }

    pub fn load_metadata(&self, image_id: &str) -> Result<ImageMetadata> {
        validate_id(image_id)?;
        let path = self.metadata_path(image_id);
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read image metadata: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse image metadata: {}", path.display()))
    }

    /// Remove stored images not modified within `days`, together with their
    /// metadata sidecars. Sidecars whose image is already gone expire on
    /// their own age. Returns how many images and orphaned sidecars were
    /// removed.
    pub fn cleanup_older_than(&self, days: u64) -> Result<usize> {
        if !self.dir.exists() {
            return Ok(0);
        }

        let max_age = Duration::from_secs(days.saturating_mul(24 * 60 * 60));
        let cutoff = SystemTime::now()
            .checked_sub(max_age)
            .unwrap_or(SystemTime::UNIX_EPOCH);

        let entries = fs::read_dir(&self.dir)
            .with_context(|| format!("Failed to read image directory: {}", self.dir.display()))?;

        let mut removed = 0;
        for entry in entries {
            let path = entry?.path();
            let is_image = match path.extension().and_then(|s| s.to_str()) {
                Some("png") => true,
                // Handled with its image unless orphaned
                Some("json") => false,
                _ => continue,
            };
            if !is_image && (!path.exists() || path.with_extension("png").exists()) {
                continue;
            }

            let modified = fs::metadata(&path)
                .and_then(|m| m.modified())
                .with_context(|| format!("Failed to stat image file: {}", path.display()))?;
            if modified >= cutoff {
                continue;
            }

            fs::remove_file(&path)
                .with_context(|| format!("Failed to remove image file: {}", path.display()))?;
            let sidecar = path.with_extension("json");
            if is_image && sidecar.exists() {
                fs::remove_file(&sidecar).with_context(|| {
                    format!("Failed to remove image metadata: {}", sidecar.display())
                })?;
            }
            debug!(path = %path.display(), "removed expired image file");
            removed += 1;
        }

        info!(removed, days, "image cleanup finished");
        Ok(removed)
    }
}

impl ImageReferences for ImageStore {
    fn store_image(&self, bytes: &[u8], source: ImageSource) -> Result<String> {
        validate_id(&source.document_id)
            .with_context(|| format!("Invalid document id '{}'", source.document_id))?;
        if source.page == 0 {
            bail!("Page numbers start at 1");
        }
        if !bytes.starts_with(&PNG_SIGNATURE) {
            bail!("Image data is not a PNG");
        }

        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create image directory: {}", self.dir.display()))?;

        let suffix: String = Uuid::new_v4()
            .simple()
            .to_string()
            .chars()
            .take(IMAGE_ID_SUFFIX_LEN)
            .collect();
        let image_id = format!("{}_{}_{suffix}", source.document_id, source.page);
        validate_id(&image_id)
            .with_context(|| format!("Document id '{}' is too long", source.document_id))?;

        let image_path = self.image_path(&image_id);
        fs::write(&image_path, bytes)
            .with_context(|| format!("Failed to write image: {}", image_path.display()))?;

        let metadata = ImageMetadata {
            image_id: image_id.clone(),
            document_id: source.document_id,
            page: source.page,
            bbox: source.bbox,
            saved_at: Utc::now(),
            file_path: image_path,
        };
        let metadata_path = self.metadata_path(&image_id);
        let json =
            serde_json::to_string_pretty(&metadata).context("Failed to serialize image metadata")?;
        fs::write(&metadata_path, json).with_context(|| {
            format!("Failed to write image metadata: {}", metadata_path.display())
        })?;

        info!(image_id = %image_id, "image stored");
        Ok(image_id)
    }
}

#[cfg(test)]
pub(crate) fn tiny_png() -> Vec<u8> {
    let mut bytes = PNG_SIGNATURE.to_vec();
    bytes.extend_from_slice(b"\0\0\0\rIHDR-not-a-real-image");
    bytes
}
