//! Inventory fetch: one blocking GET, one JSON array.
use anyhow::{anyhow, Context, Result};
use serde_json::Value;
use std::time::Instant;

/// An inventory record exactly as the API delivered it.
pub type RawItem = serde_json::Map<String, Value>;

/// Fetch and parse the inventory. Any transport, status or parse failure is
/// returned as an error; there is no retry.
pub fn fetch_inventory(url: &str) -> Result<Vec<RawItem>> {
    let start = Instant::now();
    let mut response = ureq::get(url)
        .call()
        .with_context(|| format!("fetch inventory from {url}"))?;
    let body = response
        .body_mut()
        .read_to_string()
        .context("read inventory response body")?;
    let items = parse_inventory(&body)?;

    tracing::info!(
        elapsed_ms = start.elapsed().as_millis() as u64,
        response_bytes = body.len(),
        items = items.len(),
        "inventory fetched"
    );
    Ok(items)
}

/// Parse an inventory body. Non-object entries become empty records so the
/// enricher still produces one page per entry.
pub fn parse_inventory(text: &str) -> Result<Vec<RawItem>> {
    let value: Value = serde_json::from_str(text).context("parse inventory JSON")?;
    let Value::Array(entries) = value else {
        return Err(anyhow!("inventory response is not a JSON array"));
    };
    Ok(entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| match entry {
            Value::Object(map) => map,
            other => {
                tracing::warn!(index, kind = value_kind(&other), "inventory entry is not an object");
                RawItem::new()
            }
        })
        .collect())
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
#[path = "fetch_tests.rs"]
mod tests;
