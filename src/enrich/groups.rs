//! The engine, distance and colour highlight cards on a detail page.
use super::format::{iso_to_day_month_year, MISSING};
use super::{display_text, field_text, RawItem};
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SpecGroup {
    pub label: String,
    pub value: String,
    pub details: Vec<SpecDetail>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SpecDetail {
    pub label: String,
    pub value: String,
}

/// Derived values the groups reuse instead of recomputing.
pub(super) struct GroupInputs<'a> {
    pub km_display: &'a str,
    pub year: Option<i32>,
    pub color_exterior: &'a str,
    pub color_interior: &'a str,
}

pub(super) fn spec_groups(raw: &RawItem, inputs: &GroupInputs<'_>) -> Vec<SpecGroup> {
    vec![
        engine_group(raw),
        distance_group(raw, inputs),
        color_group(raw, inputs),
    ]
}

fn engine_group(raw: &RawItem) -> SpecGroup {
    SpecGroup {
        label: "Motor".to_string(),
        value: display_text(raw, "vermogen"),
        details: vec![
            detail("Vermogen", display_text(raw, "vermogen")),
            detail("Koppel", display_text(raw, "koppel")),
            detail("Brandstof", display_text(raw, "brandstof")),
            detail("Transmissie", display_text(raw, "transmissie")),
            detail("Cilinderinhoud", display_text(raw, "cilinderinhoud")),
        ],
    }
}

fn distance_group(raw: &RawItem, inputs: &GroupInputs<'_>) -> SpecGroup {
    let km = if inputs.km_display.is_empty() {
        MISSING.to_string()
    } else {
        format!("{} km", inputs.km_display)
    };
    let year = inputs
        .year
        .map(|year| year.to_string())
        .unwrap_or_else(|| MISSING.to_string());
    SpecGroup {
        label: "Kilometerstand".to_string(),
        value: km.clone(),
        details: vec![
            detail("Kilometerstand", km),
            detail("Bouwjaar", year),
            detail("Gewicht", display_text(raw, "gewicht")),
            detail("Topsnelheid", display_text(raw, "topsnelheid")),
            detail("APK tot", inspection_date(raw)),
        ],
    }
}

fn color_group(raw: &RawItem, inputs: &GroupInputs<'_>) -> SpecGroup {
    SpecGroup {
        label: "Kleur".to_string(),
        value: inputs.color_exterior.to_string(),
        details: vec![
            detail("Exterieur", inputs.color_exterior.to_string()),
            detail("Interieur", inputs.color_interior.to_string()),
            detail("Garantie", display_text(raw, "garantie")),
            detail("BTW", vat_label(raw.get("btw-auto"))),
            detail("Lease vanaf", lease_label(&field_text(raw, "leasePrice"))),
        ],
    }
}

/// `apk.vervaldatum` as DD-MM-YYYY; unparseable dates are shown verbatim.
fn inspection_date(raw: &RawItem) -> String {
    let text = raw
        .get("apk")
        .and_then(Value::as_object)
        .map(|apk| field_text(apk, "vervaldatum"))
        .unwrap_or_default();
    let text = text.trim();
    if text.is_empty() {
        return MISSING.to_string();
    }
    iso_to_day_month_year(text).unwrap_or_else(|| text.to_string())
}

/// Any truthy `btw-auto` means VAT is included; a falsy one is a margin car.
fn vat_label(value: Option<&Value>) -> String {
    let Some(value) = value else {
        return MISSING.to_string();
    };
    let truthy = match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    };
    let label = if truthy { "Incl. BTW" } else { "Marge" };
    label.to_string()
}

fn lease_label(price: &str) -> String {
    let price = price.trim();
    if price.is_empty() {
        return MISSING.to_string();
    }
    format!("€ {price},- p/m")
}

fn detail(label: &str, value: String) -> SpecDetail {
    SpecDetail {
        label: label.to_string(),
        value,
    }
}
