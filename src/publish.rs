//! Output tree preparation: reset, static directories, root files.
use crate::config::{SiteConfig, SitePaths};
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Remove the output directory if present and recreate it empty.
pub fn reset_output(paths: &SitePaths) -> Result<()> {
    let root = paths.output_root();
    if root.exists() {
        fs::remove_dir_all(root).with_context(|| format!("remove {}", root.display()))?;
    }
    fs::create_dir_all(root).with_context(|| format!("create {}", root.display()))?;
    Ok(())
}

/// Copy every configured static directory into the output. A missing
/// directory is an error.
pub fn copy_static_dirs(config: &SiteConfig, paths: &SitePaths) -> Result<usize> {
    let mut copied = 0;
    for dir in &config.static_dirs {
        let src = paths.source_root().join(dir);
        let dst = paths.output_root().join(dir);
        copied += copy_dir_recursive(&src, &dst)
            .with_context(|| format!("copy static dir {}", src.display()))?;
        tracing::debug!(dir = %dir, "static dir copied");
    }
    Ok(copied)
}

/// Copy whitelisted root files that exist; absent ones are skipped.
pub fn copy_root_files(config: &SiteConfig, paths: &SitePaths) -> Result<Vec<String>> {
    let mut copied = Vec::new();
    for name in &config.root_files {
        let src = paths.source_root().join(name);
        if !src.is_file() {
            tracing::debug!(file = %name, "root file absent; skipped");
            continue;
        }
        let dst = paths.output_root().join(name);
        if let Some(parent) = dst.parent() {
            fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
        }
        fs::copy(&src, &dst).with_context(|| format!("copy {}", src.display()))?;
        copied.push(name.clone());
    }
    Ok(copied)
}

/// Returns the number of files copied.
fn copy_dir_recursive(src: &Path, dst: &Path) -> Result<usize> {
    let entries = fs::read_dir(src).with_context(|| format!("read {}", src.display()))?;
    fs::create_dir_all(dst).with_context(|| format!("create {}", dst.display()))?;
    let mut copied = 0;
    for entry in entries {
        let entry = entry.with_context(|| format!("read entry in {}", src.display()))?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());
        if src_path.is_dir() {
            copied += copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            fs::copy(&src_path, &dst_path)
                .with_context(|| format!("copy {}", src_path.display()))?;
            copied += 1;
        }
    }
    Ok(copied)
}

#[cfg(test)]
#[path = "publish_tests.rs"]
mod tests;
