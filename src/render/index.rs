//! Home page: featured cars injected into the hand-written index document.
use super::base_context;
use crate::config::{SiteConfig, SitePaths};
use crate::enrich::DerivedItem;
use crate::templates::TemplateEnv;
use crate::util::write_text;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::fs;

/// Write the home page. Returns whether featured cards were injected.
pub fn render_index(
    env: &mut TemplateEnv,
    config: &SiteConfig,
    paths: &SitePaths,
    featured: &[&DerivedItem],
    build_date: NaiveDate,
) -> Result<bool> {
    let base_path = paths.base_index_path(config);
    let base = fs::read_to_string(&base_path)
        .with_context(|| format!("read base index {}", base_path.display()))?;

    let mut fragments = String::new();
    for car in featured {
        let mut context = base_context(config, build_date);
        context.insert("car", car);
        let fragment = env
            .render(&config.featured_template, &context)
            .with_context(|| format!("render featured card {}", car.detail_file))?;
        fragments.push_str(&fragment);
    }

    let (page, injected) = inject_featured(&base, &config.featured_placeholder, &fragments);
    if !fragments.is_empty() && !injected {
        tracing::warn!(
            placeholder = %config.featured_placeholder,
            path = %base_path.display(),
            "featured placeholder not found; index written unchanged"
        );
    }
    write_text(paths.output_root(), "index.html", &page)?;
    Ok(injected)
}

/// Replace every occurrence of `placeholder` with `fragments`. With no
/// fragments, or no placeholder, the base document is returned unchanged.
pub fn inject_featured(base: &str, placeholder: &str, fragments: &str) -> (String, bool) {
    if fragments.is_empty() || !base.contains(placeholder) {
        return (base.to_string(), false);
    }
    (base.replace(placeholder, fragments), true)
}
