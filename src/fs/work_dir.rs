use anyhow::{bail, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::models::constants::{files, WORK_DIR_NAME};

const SUBDIRS: [&str; 3] = ["images", "exports", "recovery"];

pub struct WorkDir {
    root: PathBuf,
}

impl WorkDir {
    pub fn new<P: AsRef<Path>>(base_path: P) -> Result<Self> {
        let root = base_path.as_ref().join(WORK_DIR_NAME);
        Ok(Self { root })
    }

    /// Create the directory tree. With `force` an existing tree is reused;
    /// its artifacts are left for the caller to overwrite.
    pub fn initialize(&self, force: bool) -> Result<()> {
        if self.root.exists() && !force {
            bail!(
                "{WORK_DIR_NAME} directory already exists at {}. Use --force to reinitialize.",
                self.root.display()
            );
        }

        fs::create_dir_all(&self.root)
            .with_context(|| format!("Failed to create {WORK_DIR_NAME} directory"))?;
        self.ensure_subdirs()?;
        self.create_readme()?;

        Ok(())
    }

    pub fn load(&self) -> Result<()> {
        if !self.root.exists() {
            bail!("{WORK_DIR_NAME} directory does not exist. Run 'annotrack init <dataset>' first.");
        }
        if !self.catalog_path().exists() {
            bail!(
                "No catalog found in {}. Run 'annotrack init <dataset>' first.",
                self.root.display()
            );
        }

        self.ensure_subdirs()
    }

    fn ensure_subdirs(&self) -> Result<()> {
        for dir in &SUBDIRS {
            let path = self.root.join(dir);
            if !path.exists() {
                fs::create_dir(&path)
                    .with_context(|| format!("Failed to create directory: {dir}"))?;
            }
        }
        Ok(())
    }

    fn create_readme(&self) -> Result<()> {
        let readme_content = r#"# annotrack Work Directory

This directory is managed by annotrack and contains:

- `config.toml` - Export batch size and image retention
- `catalog.json` - Work items and their sub-task descriptions
- `progress.json` - Checkpoint of every recorded annotation
- `export-state.toml` - Watermark of the last export
- `images/` - Stored image crops and their metadata
- `exports/` - Batch and final export artifacts
- `recovery/` - Checkpoints archived before a repair

Do not manually edit these files while an annotation session is running.
"#;

        let readme_path = self.root.join("README.md");
        fs::write(readme_path, readme_content).context("Failed to create README.md")?;

        Ok(())
    }

    pub fn config_path(&self) -> PathBuf {
        self.root.join(files::CONFIG)
    }

    pub fn catalog_path(&self) -> PathBuf {
        self.root.join(files::CATALOG)
    }

    pub fn checkpoint_path(&self) -> PathBuf {
        self.root.join(files::CHECKPOINT)
    }

    pub fn export_state_path(&self) -> PathBuf {
        self.root.join(files::EXPORT_STATE)
    }

    pub fn images_dir(&self) -> PathBuf {
        self.root.join("images")
    }

    pub fn exports_dir(&self) -> PathBuf {
        self.root.join("exports")
    }

    pub fn recovery_dir(&self) -> PathBuf {
        self.root.join("recovery")
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the project root (parent of the work directory)
    pub fn project_root(&self) -> Option<&Path> {
        self.root.parent()
    }
}
