//! Inventory enrichment: raw API records to display-ready records.
//!
//! Enrichment is best-effort by contract. Every lookup falls back to a literal
//! (`n.b.`), zero or `None` when a field is missing or malformed, and
//! `enrich_item` always returns a fully populated record. Records are never
//! rejected here.
use crate::fetch::RawItem;
use chrono::Datelike;
use serde::Serialize;
use serde_json::Value;

mod format;
mod groups;

pub use format::{group_thousands, THOUSANDS_SEPARATOR};
pub use groups::SpecGroup;

use format::{
    description_html, digit_string_number, file_safe, first_year, is_sold, parse_iso_date,
    price_number, slugify, split_color, thousands_display, MISSING,
};
use groups::{spec_groups, GroupInputs};

/// Alternative field names for the brochure/document link, in priority order.
const DOCUMENT_FIELDS: [&str; 4] = ["brochure", "document", "documentUrl", "pdf"];

/// A raw record plus the computed fields templates render.
///
/// The raw fields are flattened first so computed fields win on a name clash.
#[derive(Debug, Clone, Serialize)]
pub struct DerivedItem {
    #[serde(flatten)]
    pub raw: RawItem,
    pub sold: bool,
    pub price_num: u64,
    pub slug: String,
    pub km_num: u64,
    pub km_display: String,
    pub year: Option<i32>,
    pub description_html: String,
    pub document_url: Option<String>,
    pub color_exterior: String,
    pub color_interior: String,
    pub spec_groups: Vec<SpecGroup>,
    pub detail_file: String,
    pub detail_url: String,
}

impl DerivedItem {
    /// Text of a raw field; numbers are rendered, missing values are empty.
    pub fn text(&self, key: &str) -> String {
        field_text(&self.raw, key)
    }

    pub fn id(&self) -> String {
        self.text("id")
    }
}

/// Enrich every record, preserving input order.
pub fn enrich_all(items: Vec<RawItem>, detail_dir: &str) -> Vec<DerivedItem> {
    items
        .into_iter()
        .map(|raw| enrich_item(raw, detail_dir))
        .collect()
}

/// Derive the display fields of one record. Never fails.
pub fn enrich_item(raw: RawItem, detail_dir: &str) -> DerivedItem {
    let price_text = field_text(&raw, "prijs");
    let sold = is_sold(&price_text);
    let price_num = price_number(&price_text);

    let slug = slugify(&format!(
        "{} {}",
        field_text(&raw, "merk"),
        field_text(&raw, "model")
    ));

    let km_num = distance_number(raw.get("km-stand"));
    let km_display = thousands_display(&field_text(&raw, "km-stand"));
    let year = model_year(&raw);
    let description_html = description_html(&field_text(&raw, "omschrijving"));
    let document_url = DOCUMENT_FIELDS
        .iter()
        .map(|key| field_text(&raw, key).trim().to_string())
        .find(|value| !value.is_empty());
    let (color_exterior, color_interior) = split_color(&field_text(&raw, "kleur"));

    let spec_groups = spec_groups(
        &raw,
        &GroupInputs {
            km_display: &km_display,
            year,
            color_exterior: &color_exterior,
            color_interior: &color_interior,
        },
    );

    let detail_file = detail_file_name(&slug, &file_safe(&field_text(&raw, "id")));
    let detail_url = format!("{}/{}", detail_dir.trim_matches('/'), detail_file);

    DerivedItem {
        raw,
        sold,
        price_num,
        slug,
        km_num,
        km_display,
        year,
        description_html,
        document_url,
        color_exterior,
        color_interior,
        spec_groups,
        detail_file,
        detail_url,
    }
}

/// `slug-id.html`, falling back to whichever half is present.
fn detail_file_name(slug: &str, id: &str) -> String {
    let stem = match (slug.is_empty(), id.is_empty()) {
        (false, false) => format!("{slug}-{id}"),
        (true, false) => id.to_string(),
        (false, true) => slug.to_string(),
        (true, true) => "onbekend".to_string(),
    };
    format!("{stem}.html")
}

fn distance_number(value: Option<&Value>) -> u64 {
    match value {
        Some(Value::Number(number)) => number.as_u64().unwrap_or(0),
        Some(Value::String(text)) => digit_string_number(text),
        _ => 0,
    }
}

/// First 4-digit run of `bouwjaar`, else the year of the ISO
/// `datum-eerste-toelating`.
fn model_year(raw: &RawItem) -> Option<i32> {
    first_year(&field_text(raw, "bouwjaar")).or_else(|| {
        parse_iso_date(&field_text(raw, "datum-eerste-toelating")).map(|date| date.year())
    })
}

pub(crate) fn field_text(raw: &RawItem, key: &str) -> String {
    match raw.get(key) {
        Some(Value::String(text)) => text.clone(),
        Some(Value::Number(number)) => number.to_string(),
        Some(Value::Bool(flag)) => flag.to_string(),
        _ => String::new(),
    }
}

pub(crate) fn display_text(raw: &RawItem, key: &str) -> String {
    let text = field_text(raw, key);
    let trimmed = text.trim();
    if trimmed.is_empty() {
        MISSING.to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
#[path = "enrich_tests.rs"]
mod tests;
