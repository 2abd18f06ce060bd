use super::site_url;
use crate::config::{SiteConfig, SitePaths};
use crate::enrich::DerivedItem;
use crate::templates::{TemplateEnv, SITEMAP_TEMPLATE, SITEMAP_TEMPLATE_NAME};
use crate::util::write_text;
use anyhow::Result;
use chrono::NaiveDate;
use std::path::PathBuf;

/// Write `sitemap.xml`: the listing page plus one entry per car, all stamped
/// with the build date.
pub fn render_sitemap(
    env: &mut TemplateEnv,
    config: &SiteConfig,
    paths: &SitePaths,
    items: &[DerivedItem],
    build_date: NaiveDate,
) -> Result<PathBuf> {
    env.add_raw(SITEMAP_TEMPLATE_NAME, SITEMAP_TEMPLATE)?;
    let mut context = tera::Context::new();
    context.insert("site_url", site_url(config));
    context.insert("listing_page", &config.listing_page);
    context.insert("lastmod", &build_date.format("%Y-%m-%d").to_string());
    context.insert("cars", items);
    let xml = env.render(SITEMAP_TEMPLATE_NAME, &context)?;
    write_text(paths.output_root(), "sitemap.xml", &xml)?;
    Ok(paths.sitemap_path())
}
