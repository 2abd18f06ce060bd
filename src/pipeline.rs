//! The build: fetch, enrich, sort, publish, render.
//!
//! Fetching, resetting the output and copying static directories are fatal
//! and return `Err`. Each rendering step is recoverable: its error is logged,
//! recorded in the report, and the next step runs.
use crate::catalog::{select_featured, sort_items};
use crate::config::{validate_output_location, SiteConfig, SitePaths};
use crate::enrich::{enrich_all, DerivedItem};
use crate::fetch::fetch_inventory;
use crate::publish::{copy_root_files, copy_static_dirs, reset_output};
use crate::render::{render_details, render_index, render_listing, render_sitemap};
use crate::templates::TemplateEnv;
use crate::util::display_path;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use rand::Rng;
use serde::Serialize;
use std::path::Path;
use std::time::Instant;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Listing,
    Details,
    Index,
    Sitemap,
}

#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    pub step: Step,
    pub ok: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub outputs: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BuildReport {
    pub build_date: String,
    pub output_dir: String,
    pub items: usize,
    pub sold: usize,
    pub featured: Vec<String>,
    pub featured_injected: bool,
    pub root_files: Vec<String>,
    pub static_files: usize,
    pub steps: Vec<StepReport>,
}

impl BuildReport {
    pub fn failed_steps(&self) -> Vec<Step> {
        self.steps
            .iter()
            .filter(|report| !report.ok)
            .map(|report| report.step)
            .collect()
    }
}

/// Fetch the inventory from `config.api_url` and build the site.
pub fn run_build<R: Rng + ?Sized>(
    config: &SiteConfig,
    source_root: &Path,
    build_date: NaiveDate,
    rng: &mut R,
) -> Result<BuildReport> {
    let raw = fetch_inventory(&config.api_url)?;
    let items = enrich_all(raw, &config.detail_dir);
    build_site(config, source_root, items, build_date, rng)
}

/// Everything after the fetch. Split out so the build runs against
/// in-memory records.
pub fn build_site<R: Rng + ?Sized>(
    config: &SiteConfig,
    source_root: &Path,
    mut items: Vec<DerivedItem>,
    build_date: NaiveDate,
    rng: &mut R,
) -> Result<BuildReport> {
    let started = Instant::now();
    sort_items(&mut items);
    let sold = items.iter().filter(|item| item.sold).count();
    tracing::info!(items = items.len(), sold, "inventory enriched");

    validate_output_location(config, source_root)?;
    let paths = SitePaths::new(source_root, config);
    reset_output(&paths).context("reset output directory")?;
    let static_files = copy_static_dirs(config, &paths)?;
    let root_files = copy_root_files(config, &paths)?;
    tracing::info!(
        static_files,
        root_files = root_files.len(),
        "static content copied"
    );

    let mut env = TemplateEnv::new(&paths.template_dir(config));
    let rel = |path: &Path| display_path(path, Some(paths.output_root()));
    let mut steps = Vec::new();

    steps.push(step_report(
        Step::Listing,
        render_listing(&mut env, config, &paths, &items, build_date).map(|path| vec![rel(&path)]),
    ));
    steps.push(step_report(
        Step::Details,
        render_details(&mut env, config, &paths, &items, build_date),
    ));

    let featured = select_featured(&items, config.featured_count, rng);
    let featured_ids: Vec<String> = featured.iter().map(|car| car.id()).collect();
    let mut featured_injected = false;
    steps.push(step_report(
        Step::Index,
        render_index(&mut env, config, &paths, &featured, build_date).map(|injected| {
            featured_injected = injected;
            vec![rel(&paths.index_path())]
        }),
    ));
    steps.push(step_report(
        Step::Sitemap,
        render_sitemap(&mut env, config, &paths, &items, build_date).map(|path| vec![rel(&path)]),
    ));

    let report = BuildReport {
        build_date: build_date.format("%Y-%m-%d").to_string(),
        output_dir: paths.output_root().display().to_string(),
        items: items.len(),
        sold,
        featured: featured_ids,
        featured_injected,
        root_files,
        static_files,
        steps,
    };
    let failed = report.failed_steps().len();
    tracing::info!(
        elapsed_ms = started.elapsed().as_millis() as u64,
        failed_steps = failed,
        "build finished"
    );
    Ok(report)
}

fn step_report(step: Step, result: Result<Vec<String>>) -> StepReport {
    match result {
        Ok(outputs) => {
            tracing::debug!(?step, outputs = outputs.len(), "step done");
            StepReport {
                step,
                ok: true,
                outputs,
                error: None,
            }
        }
        Err(err) => {
            tracing::error!(?step, "{err:#}");
            StepReport {
                step,
                ok: false,
                outputs: Vec::new(),
                error: Some(format!("{err:#}")),
            }
        }
    }
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
