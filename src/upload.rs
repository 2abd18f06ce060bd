//! Upload the site sources to a public storage bucket.
//!
//! Objects are sent one at a time through the storage JSON API media upload
//! endpoint with `predefinedAcl=publicRead`. The first failure stops the run.
use crate::config::UploadConfig;
use crate::util::slash_path;
use anyhow::{anyhow, Context, Result};
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// A local file and the object name it is stored under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub path: PathBuf,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct UploadedObject {
    pub name: String,
    pub public_url: String,
    pub content_type: String,
    pub bytes: u64,
    pub uploaded: bool,
}

/// Fixed files first, in configured order, then glob matches sorted by path.
/// Directories matched by a glob are skipped; a missing fixed file is an error.
pub fn collect_upload_files(source_root: &Path, config: &UploadConfig) -> Result<Vec<UploadFile>> {
    let mut files = Vec::new();
    for name in &config.files {
        let path = source_root.join(name);
        if !path.is_file() {
            return Err(anyhow!("upload file {} not found", path.display()));
        }
        files.push(UploadFile {
            name: slash_path(&path, source_root),
            path,
        });
    }

    let root_pattern = glob::Pattern::escape(&source_root.to_string_lossy());
    for pattern in &config.globs {
        let full = format!("{root_pattern}/{pattern}");
        let mut matches: Vec<PathBuf> = glob::glob(&full)
            .with_context(|| format!("invalid upload glob {pattern}"))?
            .filter_map(|entry| entry.ok())
            .filter(|path| path.is_file())
            .collect();
        matches.sort();
        tracing::debug!(pattern = %pattern, matches = matches.len(), "upload glob expanded");
        files.extend(matches.into_iter().map(|path| UploadFile {
            name: slash_path(&path, source_root),
            path,
        }));
    }
    Ok(files)
}

/// Upload every collected file. With `dry_run` nothing is sent and no token
/// is needed.
pub fn run_upload(
    source_root: &Path,
    config: &UploadConfig,
    token: Option<&str>,
    dry_run: bool,
) -> Result<Vec<UploadedObject>> {
    let files = collect_upload_files(source_root, config)?;
    let token = match (token, dry_run) {
        (Some(token), _) => token,
        (None, true) => "",
        (None, false) => {
            return Err(anyhow!(
                "no upload token; set {} or use --dry-run",
                config.token_env
            ))
        }
    };

    let total = files.len();
    let started = Instant::now();
    let mut uploaded = Vec::with_capacity(total);
    for (index, file) in files.iter().enumerate() {
        tracing::info!(
            progress = %format!("{}/{}", index + 1, total),
            object = %file.name,
            "uploading"
        );
        let object = if dry_run {
            describe_object(config, file, false)?
        } else {
            upload_file(config, token, file)
                .with_context(|| format!("upload {} to bucket {}", file.name, config.bucket))?
        };
        uploaded.push(object);
    }
    tracing::info!(
        elapsed_ms = started.elapsed().as_millis() as u64,
        objects = uploaded.len(),
        dry_run,
        "upload finished"
    );
    Ok(uploaded)
}

fn upload_file(config: &UploadConfig, token: &str, file: &UploadFile) -> Result<UploadedObject> {
    let bytes = fs::read(&file.path).with_context(|| format!("read {}", file.path.display()))?;
    let content_type = content_type(&file.path);
    let url = format!(
        "{}/upload/storage/v1/b/{}/o",
        config.endpoint.trim_end_matches('/'),
        config.bucket
    );
    let mut response = ureq::post(&url)
        .query("uploadType", "media")
        .query("name", &file.name)
        .query("predefinedAcl", "publicRead")
        .header("Authorization", format!("Bearer {token}"))
        .header("Content-Type", content_type)
        .send(&bytes[..])?;
    let body: Value = response
        .body_mut()
        .read_json()
        .context("parse upload response")?;

    let mut object = describe_object(config, file, true)?;
    if let Some(name) = body.get("name").and_then(Value::as_str) {
        object.name = name.to_string();
    }
    Ok(object)
}

fn describe_object(
    config: &UploadConfig,
    file: &UploadFile,
    uploaded: bool,
) -> Result<UploadedObject> {
    let bytes = fs::metadata(&file.path)
        .with_context(|| format!("stat {}", file.path.display()))?
        .len();
    Ok(UploadedObject {
        name: file.name.clone(),
        public_url: public_url(config, &file.name),
        content_type: content_type(&file.path).to_string(),
        bytes,
        uploaded,
    })
}

pub fn public_url(config: &UploadConfig, name: &str) -> String {
    format!(
        "{}/{}/{}",
        config.endpoint.trim_end_matches('/'),
        config.bucket,
        name
    )
}

/// Content type by file extension, case-insensitive.
pub fn content_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "html" | "htm" => "text/html; charset=utf-8",
        "css" => "text/css; charset=utf-8",
        "js" | "mjs" => "text/javascript; charset=utf-8",
        "json" => "application/json",
        "xml" => "application/xml",
        "txt" => "text/plain; charset=utf-8",
        "svg" => "image/svg+xml",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "avif" => "image/avif",
        "ico" => "image/x-icon",
        "pdf" => "application/pdf",
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
#[path = "upload_tests.rs"]
mod tests;
