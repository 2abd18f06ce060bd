//! Page rendering for the static site.
//!
//! Each function renders one kind of output and returns an error for the
//! caller to log; none of them aborts the build on its own.
use crate::config::{SiteConfig, SitePaths};
use crate::enrich::DerivedItem;
use crate::staging::StagingTxn;
use crate::templates::TemplateEnv;
use crate::util::{slash_path, write_text};
use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};
use std::path::PathBuf;

mod index;
mod sitemap;

pub use index::render_index;
pub use sitemap::render_sitemap;

/// Variables every page template can use.
pub(crate) fn base_context(config: &SiteConfig, build_date: NaiveDate) -> tera::Context {
    let mut context = tera::Context::new();
    context.insert("site_url", site_url(config));
    context.insert("listing_page", &config.listing_page);
    context.insert("build_date", &build_date.format("%d-%m-%Y").to_string());
    context.insert("build_year", &build_date.year());
    context
}

pub(crate) fn site_url(config: &SiteConfig) -> &str {
    config.site_url.trim_end_matches('/')
}

/// Render the inventory listing with the full sorted collection.
pub fn render_listing(
    env: &mut TemplateEnv,
    config: &SiteConfig,
    paths: &SitePaths,
    items: &[DerivedItem],
    build_date: NaiveDate,
) -> Result<PathBuf> {
    let mut context = base_context(config, build_date);
    context.insert("cars", items);
    context.insert("total", &items.len());
    context.insert("sold", &items.iter().filter(|item| item.sold).count());
    let html = env.render(&config.listing_template, &context)?;
    let path = paths.listing_path(config);
    write_text(paths.output_root(), &config.listing_page, &html)?;
    Ok(path)
}

/// Render one detail page per car. Pages are staged and only published when
/// every page rendered; on error nothing from this step reaches the output.
pub fn render_details(
    env: &mut TemplateEnv,
    config: &SiteConfig,
    paths: &SitePaths,
    items: &[DerivedItem],
    build_date: NaiveDate,
) -> Result<Vec<String>> {
    let txn = StagingTxn::new_in(paths.output_root(), ".detail-")?;
    for item in items {
        let mut context = base_context(config, build_date);
        context.insert("car", item);
        let html = env
            .render(&config.detail_template, &context)
            .with_context(|| format!("render detail page {}", item.detail_file))?;
        txn.write_text(&item.detail_file, &html)?;
    }
    let published = txn.publish(&paths.detail_dir(config))?;
    Ok(published
        .iter()
        .map(|path| slash_path(path, paths.output_root()))
        .collect())
}

#[cfg(test)]
#[path = "render_tests.rs"]
mod tests;
