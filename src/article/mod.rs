//! Article records
//!
//! This module turns a fetched article page into the canonical `Article` record:
//! - Title and body text via the site's selectors
//! - A deterministic id derived from the article URL
//! - A publication time normalized by the `timestamp` fallback chain

pub mod timestamp;

use crate::config::SiteConfig;
use crate::crawler::Document;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

pub use timestamp::{extract_time_attribute, normalize_timestamp, parse_smart_timestamp};

/// One extracted article
///
/// Serialized with the field names consumers of the article files expect
/// (`publishTime`, `crawledAt`) and timestamps formatted as `yyyy-MM-dd HH:mm:ss` UTC.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    /// Hex SHA-256 of the article URL
    pub id: String,
    pub url: String,
    pub title: String,
    pub body: String,
    /// Host name of the site the article was crawled from
    pub source: String,
    #[serde(rename = "publishTime", with = "record_time")]
    pub published_at: DateTime<Utc>,
    #[serde(rename = "crawledAt", with = "record_time")]
    pub crawled_at: DateTime<Utc>,
}

impl fmt::Display for Article {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}) {} - {}", self.id, self.source, self.title)
    }
}

/// Computes the article id for a URL
pub fn article_id(url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(url.as_bytes());
    hex::encode(hasher.finalize())
}

/// Builds an `Article` from a fetched article page
///
/// Missing title or body selectors produce empty strings, and an unusable timestamp
/// resolves to the crawl time, so this never fails.
///
/// # Arguments
///
/// * `document` - The parsed article page
/// * `url` - The article URL as it was discovered (the id is derived from it)
/// * `site` - The site the article belongs to
pub fn build_article(document: &Document, url: &str, site: &SiteConfig) -> Article {
    let title = document.select_text(&site.article_title);
    let body = document.select_text(&site.article_body);
    let raw_time = extract_time_attribute(document.select_first(&site.article_time));

    Article {
        id: article_id(url),
        url: url.to_string(),
        title,
        body,
        source: site.source(),
        published_at: parse_smart_timestamp(&raw_time),
        crawled_at: Utc::now(),
    }
}

/// Serde adapter for the `yyyy-MM-dd HH:mm:ss` record timestamp format
pub mod record_time {
    use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    pub fn serialize<S: Serializer>(instant: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&instant.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        NaiveDateTime::parse_from_str(&raw, FORMAT)
            .map(|naive| Utc.from_utc_datetime(&naive))
            .map_err(serde::de::Error::custom)
    }
}
