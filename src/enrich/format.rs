//! Text formatting helpers behind the derived display fields.
//!
//! Every function here is total: bad input yields a fallback value, never an
//! error.
use chrono::{DateTime, NaiveDate};
use regex::Regex;
use std::sync::LazyLock;

/// Marker the inventory puts in the price text of sold cars.
pub const SOLD_MARKER: &str = "verkocht";
/// Display value for any field the record does not carry.
pub const MISSING: &str = "n.b.";
pub const DESCRIPTION_FALLBACK: &str = "<p>Geen omschrijving beschikbaar.</p>";
/// nl-NL thousands separator.
pub const THOUSANDS_SEPARATOR: char = '.';

static SLUG_STRIP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9\s-]").expect("slug strip regex"));
static SLUG_COLLAPSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\s-]+").expect("slug collapse regex"));
static YEAR_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d{4}").expect("year regex"));
static BLANK_LINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\s*\n").expect("blank line regex"));

pub fn is_sold(price_text: &str) -> bool {
    price_text.to_lowercase().contains(SOLD_MARKER)
}

/// Digits of the price text as an integer; zero for sold cars, digit-free text
/// and values that do not fit.
pub fn price_number(price_text: &str) -> u64 {
    if is_sold(price_text) {
        return 0;
    }
    digits_only(price_text).parse().unwrap_or(0)
}

pub fn slugify(text: &str) -> String {
    let lowered = text.to_lowercase();
    let stripped = SLUG_STRIP.replace_all(&lowered, "");
    let collapsed = SLUG_COLLAPSE.replace_all(&stripped, "-");
    collapsed.trim_matches('-').to_string()
}

/// Parse a distance only when the text is entirely ASCII digits.
pub fn digit_string_number(text: &str) -> u64 {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return 0;
    }
    text.parse().unwrap_or(0)
}

/// Group the digits of `text` in thousands ("12000 km" -> "12.000"). Empty
/// when the text holds no digits.
pub fn thousands_display(text: &str) -> String {
    let digits = digits_only(text);
    if digits.is_empty() {
        return String::new();
    }
    let significant = digits.trim_start_matches('0');
    let significant = if significant.is_empty() { "0" } else { significant };
    group_thousands(significant, THOUSANDS_SEPARATOR)
}

pub fn group_thousands(digits: &str, separator: char) -> String {
    let chars: Vec<char> = digits.chars().collect();
    let groups: Vec<String> = chars
        .rchunks(3)
        .rev()
        .map(|group| group.iter().collect())
        .collect();
    groups.join(&separator.to_string())
}

pub fn first_year(text: &str) -> Option<i32> {
    YEAR_RUN
        .find(text)
        .and_then(|found| found.as_str().parse().ok())
}

/// Parse an ISO date or date-time and return the calendar date.
pub fn parse_iso_date(text: &str) -> Option<NaiveDate> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(stamp) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(stamp.date_naive());
    }
    let date_part = trimmed.split(['T', ' ']).next().unwrap_or(trimmed);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

/// "2025-06-01" -> "01-06-2025".
pub fn iso_to_day_month_year(text: &str) -> Option<String> {
    parse_iso_date(text).map(|date| date.format("%d-%m-%Y").to_string())
}

/// Wrap free text in paragraphs: blank lines split paragraphs, single
/// newlines become `<br>`. The text itself is passed through as-is.
pub fn description_html(text: &str) -> String {
    let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
    let trimmed = normalized.trim();
    if trimmed.is_empty() {
        return DESCRIPTION_FALLBACK.to_string();
    }
    let paragraphs: Vec<String> = BLANK_LINES
        .split(trimmed)
        .map(|paragraph| paragraph.trim().replace('\n', "<br>"))
        .collect();
    format!("<p>{}</p>", paragraphs.join("</p><p>"))
}

/// Split "Zwart, Beige" into exterior and interior colours.
pub fn split_color(text: &str) -> (String, String) {
    let mut parts = text.split(',').map(str::trim);
    let exterior = parts
        .next()
        .filter(|part| !part.is_empty())
        .unwrap_or(MISSING)
        .to_string();
    let interior = parts
        .next()
        .filter(|part| !part.is_empty())
        .unwrap_or(MISSING)
        .to_string();
    (exterior, interior)
}

/// Keep only characters that are safe in a file name.
pub fn file_safe(text: &str) -> String {
    text.chars()
        .filter(|ch| ch.is_ascii_alphanumeric() || *ch == '-' || *ch == '_')
        .collect()
}

fn digits_only(text: &str) -> String {
    text.chars().filter(char::is_ascii_digit).collect()
}

#[cfg(test)]
#[path = "format_tests.rs"]
mod tests;
