//! Article timestamp extraction and normalization
//!
//! News sites publish timestamps in every shape imaginable: `datetime` attributes,
//! epoch values in `data-*` attributes, human text such as "Updated 14 Nov 2025 at
//! 5:30 PM". Extraction picks the most promising raw string off the matched element;
//! normalization runs it through an ordered list of parsers and takes the first hit.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::ElementRef;

use crate::crawler::element_text;

/// Attribute-name fragments that suggest a timestamp
pub const TIMESTAMP_KEYWORDS: &[&str] = &[
    "time",
    "date",
    "timestamp",
    "published",
    "updated",
    "datetime",
];

/// English calendar date patterns, tried in order
pub const ENGLISH_DATE_FORMATS: &[&str] = &[
    "%d %b %Y", // 14 Nov 2025
    "%b %d, %Y", // Nov 14, 2025
    "%B %d, %Y", // November 14, 2025
    "%d %B %Y", // 14 November 2025
];

/// Date-like substring embedded in longer text ("Updated 14 Nov 2025 at 5:30 PM")
///
/// The match is parsed with `%d %b %Y`, and chrono's `%b` also takes full month names,
/// so "Updated 14 November 2025" is accepted too.
static EMBEDDED_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d{1,2} [A-Za-z]{3,} \d{4}").expect("valid date regex"));

/// One step of the normalization chain
#[derive(Debug, Clone, Copy)]
pub struct TimestampStep {
    /// Short name used in logs and tests
    pub name: &'static str,
    /// Returns `Some` when the step recognizes and parses the raw value
    pub parse: fn(&str) -> Option<DateTime<Utc>>,
}

/// The normalization chain, evaluated top to bottom
pub const TIMESTAMP_STEPS: &[TimestampStep] = &[
    TimestampStep {
        name: "epoch-millis",
        parse: parse_epoch_millis,
    },
    TimestampStep {
        name: "epoch-seconds",
        parse: parse_epoch_seconds,
    },
    TimestampStep {
        name: "rfc3339",
        parse: parse_rfc3339,
    },
    TimestampStep {
        name: "english-date",
        parse: parse_english_date,
    },
    TimestampStep {
        name: "embedded-date",
        parse: parse_embedded_date,
    },
];

/// Picks the raw timestamp string off the element matched by the site's time selector
///
/// Search order, first hit wins:
/// 1. an attribute whose name contains a timestamp keyword and whose value has a digit
/// 2. any attribute whose value has a digit
/// 3. the element's own text, if it has a digit
///
/// A missing element, or no hit at all, yields an empty string.
pub fn extract_time_attribute(element: Option<ElementRef<'_>>) -> String {
    let Some(element) = element else {
        tracing::trace!("No time element matched");
        return String::new();
    };

    for (name, value) in element.value().attrs() {
        let name = name.to_ascii_lowercase();
        let value = value.trim();
        if TIMESTAMP_KEYWORDS.iter().any(|k| name.contains(k)) && contains_digit(value) {
            return value.to_string();
        }
    }

    for (_, value) in element.value().attrs() {
        let value = value.trim();
        if contains_digit(value) {
            return value.to_string();
        }
    }

    let text = element_text(&element);
    if contains_digit(&text) {
        return text;
    }

    String::new()
}

/// Normalizes a raw timestamp, falling back to the current instant
///
/// Never fails: empty input and input no step understands both resolve to "now".
pub fn parse_smart_timestamp(raw: &str) -> DateTime<Utc> {
    match normalize_timestamp(raw) {
        Some((instant, step)) => {
            tracing::trace!("Parsed timestamp '{}' via {}", raw, step);
            instant
        }
        None => {
            if !raw.trim().is_empty() {
                tracing::debug!("Unrecognized timestamp '{}', using crawl time", raw);
            }
            Utc::now()
        }
    }
}

/// Runs the normalization chain without the "now" fallback
///
/// Returns the parsed instant together with the name of the step that produced it.
pub fn normalize_timestamp(raw: &str) -> Option<(DateTime<Utc>, &'static str)> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    TIMESTAMP_STEPS
        .iter()
        .find_map(|step| (step.parse)(raw).map(|instant| (instant, step.name)))
}

fn contains_digit(s: &str) -> bool {
    s.chars().any(|c| c.is_ascii_digit())
}

fn all_digits(raw: &str, len: usize) -> bool {
    raw.len() == len && raw.bytes().all(|b| b.is_ascii_digit())
}

fn parse_epoch_millis(raw: &str) -> Option<DateTime<Utc>> {
    if !all_digits(raw, 13) {
        return None;
    }
    let millis: i64 = raw.parse().ok()?;
    Utc.timestamp_millis_opt(millis).single()
}

fn parse_epoch_seconds(raw: &str) -> Option<DateTime<Utc>> {
    if !all_digits(raw, 10) {
        return None;
    }
    let seconds: i64 = raw.parse().ok()?;
    Utc.timestamp_opt(seconds, 0).single()
}

fn parse_rfc3339(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|instant| instant.with_timezone(&Utc))
}

fn parse_english_date(raw: &str) -> Option<DateTime<Utc>> {
    ENGLISH_DATE_FORMATS
        .iter()
        .find_map(|format| parse_date_with(raw, format))
}

fn parse_embedded_date(raw: &str) -> Option<DateTime<Utc>> {
    let candidate = EMBEDDED_DATE.find(raw)?;
    parse_date_with(candidate.as_str(), ENGLISH_DATE_FORMATS[0])
}

/// Parses a calendar date and pins it to UTC midnight
fn parse_date_with(raw: &str, format: &str) -> Option<DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(raw, format).ok()?;
    let midnight = date.and_hms_opt(0, 0, 0)?;
    Some(Utc.from_utc_datetime(&midnight))
}
