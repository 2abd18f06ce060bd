//! Lazily loaded tera templates.
//!
//! Templates are read from the template directory the first time a page asks
//! for them, so a missing or broken template only fails the page that uses
//! it. Each name is loaded at most once per build.
use crate::enrich::{group_thousands, THOUSANDS_SEPARATOR};
use anyhow::{anyhow, Context, Result};
use regex::Regex;
use std::collections::{BTreeSet, HashMap};
use std::error::Error as _;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tera::{Tera, Value};

/// Inline sitemap template. Rendered without autoescape; values go through
/// `xml_escape` explicitly.
pub const SITEMAP_TEMPLATE_NAME: &str = "__sitemap";
pub const SITEMAP_TEMPLATE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <url>
    <loc>{{ site_url | xml_escape }}/{{ listing_page | xml_escape }}</loc>
    <lastmod>{{ lastmod }}</lastmod>
  </url>
{%- for car in cars %}
  <url>
    <loc>{{ site_url | xml_escape }}/{{ car.detail_url | xml_escape }}</loc>
    <lastmod>{{ lastmod }}</lastmod>
  </url>
{%- endfor %}
</urlset>
"#;

static TEMPLATE_REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\{%-?\s*(?:extends|include|import)\s+["']([^"']+)["']"#)
        .expect("template reference regex")
});

pub struct TemplateEnv {
    dir: PathBuf,
    tera: Tera,
    loaded: BTreeSet<String>,
}

impl TemplateEnv {
    pub fn new(dir: &Path) -> Self {
        let mut tera = Tera::default();
        tera.set_escape_fn(escape_html);
        tera.register_filter("xml_escape", xml_escape_filter);
        tera.register_filter("thousands", thousands_filter);
        Self {
            dir: dir.to_path_buf(),
            tera,
            loaded: BTreeSet::new(),
        }
    }

    /// Register a template from a string, e.g. the inline sitemap.
    pub fn add_raw(&mut self, name: &str, content: &str) -> Result<()> {
        if self.loaded.contains(name) {
            return Ok(());
        }
        self.tera
            .add_raw_template(name, content)
            .with_context(|| format!("parse template {name}"))?;
        self.loaded.insert(name.to_string());
        Ok(())
    }

    pub fn render(&mut self, name: &str, context: &tera::Context) -> Result<String> {
        self.ensure_loaded(name, &mut BTreeSet::new())?;
        self.tera
            .render(name, context)
            .map_err(|err| anyhow!("render template {name}: {}", error_chain(&err)))
    }

    /// Load `name` and, first, every template it extends, includes or imports,
    /// so tera can resolve the references when `name` is added.
    fn ensure_loaded(&mut self, name: &str, visiting: &mut BTreeSet<String>) -> Result<()> {
        if self.loaded.contains(name) {
            return Ok(());
        }
        if !visiting.insert(name.to_string()) {
            return Err(anyhow!("template {name} references itself"));
        }
        let path = self.dir.join(name);
        if !path.is_file() {
            return Err(anyhow!(
                "template {name} not found in {}",
                self.dir.display()
            ));
        }
        let source =
            fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
        for dependency in referenced_templates(&source) {
            self.ensure_loaded(&dependency, visiting)?;
        }
        self.tera
            .add_raw_template(name, &source)
            .map_err(|err| anyhow!("parse template {name}: {}", error_chain(&err)))?;
        self.loaded.insert(name.to_string());
        tracing::debug!(template = name, "template loaded");
        Ok(())
    }
}

fn referenced_templates(source: &str) -> Vec<String> {
    TEMPLATE_REFERENCE
        .captures_iter(source)
        .filter_map(|caps| caps.get(1).map(|found| found.as_str().to_string()))
        .collect()
}

/// Tera nests the useful message (line, column, missing variable) in its
/// error sources.
fn error_chain(err: &tera::Error) -> String {
    let mut parts = vec![err.to_string()];
    let mut source = err.source();
    while let Some(inner) = source {
        parts.push(inner.to_string());
        source = inner.source();
    }
    parts.join(": ")
}

/// Autoescape for `.html` templates. Unlike tera's default it leaves `/`
/// alone, so URLs in attributes render as written.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

pub fn xml_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}

fn xml_escape_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let text = match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    };
    Ok(Value::String(xml_escape(&text)))
}

/// `{{ car.km_num | thousands }}` -> "12.000".
fn thousands_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let digits = match value {
        Value::Number(number) => number
            .as_u64()
            .map(|n| n.to_string())
            .ok_or_else(|| tera::Error::msg("thousands expects a non-negative integer"))?,
        Value::String(text) if !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit()) => {
            text.clone()
        }
        other => {
            return Err(tera::Error::msg(format!(
                "thousands expects digits, got {other}"
            )));
        }
    };
    Ok(Value::String(group_thousands(&digits, THOUSANDS_SEPARATOR)))
}

#[cfg(test)]
#[path = "templates_tests.rs"]
mod tests;
