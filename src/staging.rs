//! All-or-nothing output directories.
//!
//! Files are written into a temporary directory next to their destination and
//! moved into place with a single rename, so the destination either holds
//! every file or does not exist.
use crate::util::write_text;
use anyhow::{anyhow, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// A throwaway directory holding `staging/`. It is removed when the value is
/// dropped, taking any unpublished files with it.
pub struct StagingTxn {
    dir: tempfile::TempDir,
}

impl StagingTxn {
    /// Create the transaction inside `parent` so publishing is a
    /// same-filesystem rename.
    pub fn new_in(parent: &Path, prefix: &str) -> Result<Self> {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
        let dir = tempfile::Builder::new()
            .prefix(prefix)
            .tempdir_in(parent)
            .with_context(|| format!("create staging dir in {}", parent.display()))?;
        Ok(Self { dir })
    }

    pub fn staging_root(&self) -> PathBuf {
        self.dir.path().join("staging")
    }

    pub fn write_text(&self, rel_path: &str, text: &str) -> Result<()> {
        write_text(&self.staging_root(), rel_path, text)
    }

    /// Rename the staged tree to `dest` and return the published files.
    /// `dest` must not exist yet. With nothing staged, nothing is created.
    pub fn publish(self, dest: &Path) -> Result<Vec<PathBuf>> {
        let staging_root = self.staging_root();
        if !staging_root.exists() {
            return Ok(Vec::new());
        }
        if dest.exists() {
            return Err(anyhow!("publish target {} already exists", dest.display()));
        }
        let files = collect_files_recursive(&staging_root)?;
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
        }
        fs::rename(&staging_root, dest)
            .with_context(|| format!("publish {}", dest.display()))?;
        self.dir
            .close()
            .context("remove staging dir after publish")?;

        files
            .iter()
            .map(|file| {
                file.strip_prefix(&staging_root)
                    .map(|rel| dest.join(rel))
                    .context("strip staging prefix")
            })
            .collect()
    }
}

/// Every regular file under `root`, sorted by path.
pub fn collect_files_recursive(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    if !root.exists() {
        return Ok(files);
    }
    for entry in fs::read_dir(root).with_context(|| format!("read {}", root.display()))? {
        let path = entry
            .with_context(|| format!("read entry in {}", root.display()))?
            .path();
        if path.is_dir() {
            files.extend(collect_files_recursive(&path)?);
        } else if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
#[path = "staging_tests.rs"]
mod tests;
