//! Display strings and sort keys for reservation cells.
//!
//! Display text is for people and sort keys are for ordering. Both are derived
//! from the raw snapshot fields; a sort key is never parsed back out of a
//! display string.

use chrono::{NaiveDate, NaiveTime};

/// `2025-12-01` → `Dec 1, 2025`. Unparsable input is returned unchanged.
pub fn format_date_display(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }
    match parse_date(raw) {
        Some(date) => date.format("%b %-d, %Y").to_string(),
        None => raw.to_string(),
    }
}

/// `19:00` or `19:00:00` → `7:00 PM`. Unparsable input is returned unchanged.
pub fn format_time_display(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }
    match parse_time(raw) {
        Some(time) => time.format("%-I:%M %p").to_string(),
        None => raw.to_string(),
    }
}

/// Canonical date key: `YYYY-MM-DD`, or the raw text when it is not a date.
pub fn date_sort_key(raw: &str) -> String {
    let raw = raw.trim();
    parse_date(raw)
        .map(|date| date.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| raw.to_string())
}

/// Canonical time key: 24-hour `HH:MM`, or the raw text when it is not a time.
pub fn time_sort_key(raw: &str) -> String {
    let raw = raw.trim();
    parse_time(raw)
        .map(|time| time.format("%H:%M").to_string())
        .unwrap_or_else(|| raw.to_string())
}

/// Escape text for inclusion in HTML element content or attribute values.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}

/// Uppercase the first character.
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    let date_part = raw.split('T').next().unwrap_or(raw);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

fn parse_time(raw: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(raw, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
        .ok()
}
