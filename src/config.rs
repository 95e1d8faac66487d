//! `.annotrack/config.toml`
//!
//! ```toml
//! [export]
//! batch_size = 10
//! include_images = true
//!
//! [images]
//! retention_days = 7
//! ```

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::fs::locking::{locked_read, locked_write};
use crate::models::constants::{BATCH_SIZE_ENV, DEFAULT_BATCH_SIZE, DEFAULT_IMAGE_RETENTION_DAYS};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub images: ImageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExportConfig {
    /// Completions between batch exports
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Whether full exports bundle the referenced image crops
    #[serde(default = "default_true")]
    pub include_images: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            include_images: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ImageConfig {
    #[serde(default = "default_retention_days")]
    pub retention_days: u64,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            retention_days: DEFAULT_IMAGE_RETENTION_DAYS,
        }
    }
}

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

fn default_true() -> bool {
    true
}

fn default_retention_days() -> u64 {
    DEFAULT_IMAGE_RETENTION_DAYS
}

impl Config {
    /// Load from `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let config = if path.exists() {
            let content = locked_read(path)?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config: {}", path.display()))?
        } else {
            Self::default()
        };

        config.validate()?;
        Ok(config)
    }

    /// [`Config::load`] followed by environment overrides.
    pub fn load_with_env(path: &Path) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides()?;
        Ok(config)
    }

    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(value) = std::env::var(BATCH_SIZE_ENV) {
            let value = value.trim();
            if !value.is_empty() {
                self.export.batch_size = value.parse().with_context(|| {
                    format!("Invalid {BATCH_SIZE_ENV}: '{value}'. Expected a positive integer")
                })?;
            }
        }
        self.validate()
    }

    pub fn validate(&self) -> Result<()> {
        if self.export.batch_size == 0 {
            bail!("export.batch_size must be at least 1");
        }
        Ok(())
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        self.validate()?;
        let body = toml::to_string_pretty(self).context("Failed to serialize config")?;
        locked_write(path, &format!("# annotrack configuration\n\n{body}"))
            .with_context(|| format!("Failed to write config: {}", path.display()))
    }
}
