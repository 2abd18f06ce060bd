//! Site configuration helpers.
//!
//! Every URL and directory name the build and upload commands touch lives in
//! `SiteConfig`, loaded from `showroom.json` when present and otherwise taken
//! from the compiled defaults.
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Component, Path, PathBuf};

pub const CONFIG_SCHEMA_VERSION: u32 = 1;
pub const CONFIG_FILE_NAME: &str = "showroom.json";

pub const DEFAULT_API_URL: &str =
    "https://europe-west1-nick-storage-backup.cloudfunctions.net/get_cars_js";
pub const DEFAULT_FEATURED_PLACEHOLDER: &str = "<!-- FEATURED_CARS -->";

/// Build and upload settings. Directory entries are relative to the source root.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SiteConfig {
    pub schema_version: u32,
    pub api_url: String,
    pub site_url: String,
    pub output_dir: String,
    pub template_dir: String,
    pub base_index: String,
    pub listing_template: String,
    pub detail_template: String,
    pub featured_template: String,
    pub listing_page: String,
    pub detail_dir: String,
    pub featured_placeholder: String,
    pub featured_count: usize,
    pub static_dirs: Vec<String>,
    pub root_files: Vec<String>,
    pub upload: UploadConfig,
}

/// Settings for `showroom upload`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct UploadConfig {
    pub bucket: String,
    pub endpoint: String,
    pub token_env: String,
    pub files: Vec<String>,
    pub globs: Vec<String>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        default_config()
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        UploadConfig {
            bucket: "mybrandheritage.com".to_string(),
            endpoint: "https://storage.googleapis.com".to_string(),
            token_env: "SHOWROOM_UPLOAD_TOKEN".to_string(),
            files: [
                "index.html",
                "style.css",
                "script.js",
                "background-animation.js",
                "interactive.html",
            ]
            .iter()
            .map(|name| name.to_string())
            .collect(),
            globs: vec!["assets/*".to_string(), "setup/*".to_string()],
        }
    }
}

/// Build the config used when no `showroom.json` exists.
pub fn default_config() -> SiteConfig {
    SiteConfig {
        schema_version: CONFIG_SCHEMA_VERSION,
        api_url: DEFAULT_API_URL.to_string(),
        site_url: "https://example.com".to_string(),
        output_dir: "site".to_string(),
        template_dir: "templates".to_string(),
        base_index: "index.html".to_string(),
        listing_template: "voorraad.html".to_string(),
        detail_template: "auto-detail.html".to_string(),
        featured_template: "featured-card.html".to_string(),
        listing_page: "voorraad.html".to_string(),
        detail_dir: "occasions".to_string(),
        featured_placeholder: DEFAULT_FEATURED_PLACEHOLDER.to_string(),
        featured_count: 3,
        static_dirs: vec!["assets".to_string(), "css".to_string(), "js".to_string()],
        root_files: vec![
            "contact.html".to_string(),
            "over-ons.html".to_string(),
            "robots.txt".to_string(),
            "favicon.ico".to_string(),
        ],
        upload: UploadConfig::default(),
    }
}

/// Render the effective config as pretty JSON.
pub fn config_json(config: &SiteConfig) -> Result<String> {
    serde_json::to_string_pretty(config).context("serialize site config")
}

/// Load a config file from disk.
pub fn load_config(path: &Path) -> Result<SiteConfig> {
    let bytes = fs::read(path).with_context(|| format!("read config {}", path.display()))?;
    let config: SiteConfig = serde_json::from_slice(&bytes)
        .with_context(|| format!("parse site config JSON {}", path.display()))?;
    Ok(config)
}

/// Resolve the config for a source root: an explicit path wins, then
/// `showroom.json` in the source root, then the defaults.
pub fn resolve_config(source_root: &Path, explicit: Option<&Path>) -> Result<SiteConfig> {
    if let Some(path) = explicit {
        return load_config(path);
    }
    let candidate = source_root.join(CONFIG_FILE_NAME);
    if candidate.is_file() {
        tracing::debug!(path = %candidate.display(), "loading site config");
        return load_config(&candidate);
    }
    Ok(default_config())
}

/// Validate schema version, URLs and directory entries.
pub fn validate_config(config: &SiteConfig) -> Result<()> {
    if config.schema_version != CONFIG_SCHEMA_VERSION {
        return Err(anyhow!(
            "unsupported site config schema_version {}",
            config.schema_version
        ));
    }
    if config.api_url.trim().is_empty() {
        return Err(anyhow!("api_url must be non-empty"));
    }
    if config.site_url.trim().is_empty() {
        return Err(anyhow!("site_url must be non-empty"));
    }
    if config.featured_placeholder.is_empty() {
        return Err(anyhow!("featured_placeholder must be non-empty"));
    }
    validate_relative_path(&config.template_dir, "template_dir")?;
    validate_relative_path(&config.base_index, "base_index")?;
    validate_relative_path(&config.listing_page, "listing_page")?;
    validate_relative_path(&config.detail_dir, "detail_dir")?;
    for dir in &config.static_dirs {
        validate_relative_path(dir, "static_dirs")?;
    }
    for file in &config.root_files {
        validate_relative_path(file, "root_files")?;
    }
    for file in &config.upload.files {
        validate_relative_path(file, "upload.files")?;
    }
    validate_output_dir(config)?;
    Ok(())
}

/// The output directory is removed on every build, so it may be absolute but
/// must never resolve to the source root, above it, or onto a source entry.
fn validate_output_dir(config: &SiteConfig) -> Result<()> {
    let raw = config.output_dir.trim();
    let path = Path::new(raw);
    if has_parent_components(path) {
        return Err(anyhow!(
            "output_dir must not contain '..' (got {:?})",
            config.output_dir
        ));
    }
    let output = normalize(path);
    if output.as_os_str().is_empty() || output.parent().is_none() {
        return Err(anyhow!(
            "output_dir must name a dedicated directory (got {:?})",
            config.output_dir
        ));
    }
    if output.is_relative() {
        check_source_entries(config, &output, |entry| normalize(Path::new(entry)))?;
    }
    Ok(())
}

/// Check the resolved output directory against the actual source root. This
/// catches absolute `output_dir` values that point back into the sources.
pub fn validate_output_location(config: &SiteConfig, source_root: &Path) -> Result<()> {
    validate_output_dir(config)?;
    let source = std::path::absolute(source_root)
        .with_context(|| format!("resolve source root {}", source_root.display()))?;
    let source = normalize(&source);
    let output = normalize(&source.join(config.output_dir.trim()));
    if source.starts_with(&output) {
        return Err(anyhow!(
            "output_dir {} would remove the source root {}",
            output.display(),
            source.display()
        ));
    }
    check_source_entries(config, &output, |entry| {
        source.join(normalize(Path::new(entry)))
    })
}

/// The output may not equal or contain a source entry the build reads, and
/// may not sit inside a static dir that is copied into it.
fn check_source_entries(
    config: &SiteConfig,
    output: &Path,
    resolve: impl Fn(&str) -> PathBuf,
) -> Result<()> {
    let entries = [
        ("template_dir", std::slice::from_ref(&config.template_dir)),
        ("base_index", std::slice::from_ref(&config.base_index)),
        ("static_dirs", config.static_dirs.as_slice()),
        ("root_files", config.root_files.as_slice()),
    ];
    for (label, values) in entries {
        for entry in values {
            let entry_path = resolve(entry);
            let inside_static = label == "static_dirs" && output.starts_with(&entry_path);
            if entry_path.starts_with(output) || inside_static {
                return Err(anyhow!(
                    "output_dir {:?} overlaps {label} entry {entry:?}",
                    config.output_dir
                ));
            }
        }
    }
    Ok(())
}

/// Lexical normalisation: drops `.` components and resolves `..` against
/// the preceding component.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

fn validate_relative_path(rel: &str, label: &str) -> Result<()> {
    let path = Path::new(rel);
    if rel.trim().is_empty() || path.is_absolute() || has_parent_components(path) {
        return Err(anyhow!(
            "{label} entries must be relative paths without '..' (got {rel:?})"
        ));
    }
    Ok(())
}

fn has_parent_components(path: &Path) -> bool {
    path.components()
        .any(|component| matches!(component, Component::ParentDir))
}

/// Typed paths into the source and output trees.
#[derive(Debug, Clone)]
pub struct SitePaths {
    source: PathBuf,
    output: PathBuf,
}

impl SitePaths {
    pub fn new(source_root: &Path, config: &SiteConfig) -> Self {
        Self {
            source: source_root.to_path_buf(),
            output: source_root.join(&config.output_dir),
        }
    }

    pub fn source_root(&self) -> &Path {
        &self.source
    }

    pub fn output_root(&self) -> &Path {
        &self.output
    }

    pub fn template_dir(&self, config: &SiteConfig) -> PathBuf {
        self.source.join(&config.template_dir)
    }

    pub fn base_index_path(&self, config: &SiteConfig) -> PathBuf {
        self.source.join(&config.base_index)
    }

    pub fn listing_path(&self, config: &SiteConfig) -> PathBuf {
        self.output.join(&config.listing_page)
    }

    pub fn detail_dir(&self, config: &SiteConfig) -> PathBuf {
        self.output.join(&config.detail_dir)
    }

    pub fn index_path(&self) -> PathBuf {
        self.output.join("index.html")
    }

    pub fn sitemap_path(&self) -> PathBuf {
        self.output.join("sitemap.xml")
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
