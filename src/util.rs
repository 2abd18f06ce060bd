use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

pub fn display_path(path: &Path, base: Option<&Path>) -> String {
    if let Some(base) = base {
        if let Ok(relative) = path.strip_prefix(base) {
            return relative.display().to_string();
        }
    }
    path.display().to_string()
}

/// Render a path relative to `base` with forward slashes, for URLs and
/// bucket object names.
pub fn slash_path(path: &Path, base: &Path) -> String {
    let relative = path.strip_prefix(base).unwrap_or(path);
    relative
        .components()
        .map(|component| component.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Write `text` to `root/rel_path`, creating parent directories.
pub fn write_text(root: &Path, rel_path: &str, text: &str) -> Result<()> {
    let path = root.join(rel_path);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    fs::write(&path, text).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}
