//! Advisory locking and atomic replacement for work directory files
//!
//! Files are never rewritten in place. A writer takes an exclusive `fs2` lock
//! on a sidecar `.lock` file, writes the new content to a temporary file in
//! the same directory, syncs it and renames it over the target. Readers take
//! a shared lock on the same sidecar, so they observe either the old or the
//! new content, never a truncated file.

use anyhow::{Context, Result};
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Held lock on a sidecar file; released on drop.
pub struct LockGuard {
    file: File,
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

/// Sidecar lock path for `path`, e.g. `progress.json` -> `progress.json.lock`.
pub fn lock_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".lock");
    path.with_file_name(name)
}

fn open_lock_file(path: &Path) -> Result<File> {
    let lock = lock_path(path);
    OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(&lock)
        .with_context(|| format!("Failed to open lock file: {}", lock.display()))
}

pub fn lock_shared(path: &Path) -> Result<LockGuard> {
    let file = open_lock_file(path)?;
    FileExt::lock_shared(&file)
        .with_context(|| format!("Failed to acquire shared lock: {}", path.display()))?;
    Ok(LockGuard { file })
}

pub fn lock_exclusive(path: &Path) -> Result<LockGuard> {
    let file = open_lock_file(path)?;
    FileExt::lock_exclusive(&file)
        .with_context(|| format!("Failed to acquire exclusive lock: {}", path.display()))?;
    Ok(LockGuard { file })
}

/// Read a file while holding its shared lock.
pub fn locked_read(path: &Path) -> Result<String> {
    let _guard = lock_shared(path)?;
    fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path.display()))
}

/// Atomically replace `path` with `content` while holding its exclusive lock.
///
/// The content is synced to disk before the rename, so after this returns
/// the file holds either the complete new content or, on failure, the old.
pub fn locked_write(path: &Path, content: &str) -> Result<()> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory: {}", dir.display()))?;

    let _guard = lock_exclusive(path)?;

    let mut temp = NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temporary file in {}", dir.display()))?;
    temp.write_all(content.as_bytes())
        .with_context(|| format!("Failed to write temporary file for {}", path.display()))?;
    temp.as_file()
        .sync_all()
        .with_context(|| format!("Failed to sync temporary file for {}", path.display()))?;
    temp.persist(path)
        .with_context(|| format!("Failed to replace file: {}", path.display()))?;

    Ok(())
}
