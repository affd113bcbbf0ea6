//! Document query capability
//!
//! Site definitions carry CSS selectors as opaque strings. This module is the only place
//! that evaluates them: it parses a fetched page once and answers "which links match",
//! "what text matches" and "which element matches first" for any selector string.

use scraper::{ElementRef, Html, Selector};
use url::Url;

/// A parsed HTML page plus the URL relative links resolve against
///
/// `Html` is not `Send`, so a `Document` must be built, queried and dropped without an
/// `.await` in between.
pub struct Document {
    html: Html,
    base_url: Url,
}

impl Document {
    /// Parses HTML content
    ///
    /// # Arguments
    ///
    /// * `body` - The HTML content to parse
    /// * `base_url` - The URL the page was served from (after redirects)
    pub fn parse(body: &str, base_url: Url) -> Self {
        Self {
            html: Html::parse_document(body),
            base_url,
        }
    }

    /// Returns the absolute `href` of every element matched by `selector`
    ///
    /// Links come back in document order. Elements without a usable `href` are skipped,
    /// as are links excluded by `resolve_link`. An invalid selector matches nothing.
    pub fn select_links(&self, selector: &str) -> Vec<String> {
        let Some(selector) = compile(selector) else {
            return Vec::new();
        };

        self.html
            .select(&selector)
            .filter_map(|element| element.value().attr("href"))
            .filter_map(|href| resolve_link(href, &self.base_url))
            .collect()
    }

    /// Returns the combined text of every element matched by `selector`
    ///
    /// Whitespace is collapsed and the texts of multiple matches are joined by a single
    /// space. No match (or an invalid selector) yields an empty string.
    pub fn select_text(&self, selector: &str) -> String {
        let Some(selector) = compile(selector) else {
            return String::new();
        };

        self.html
            .select(&selector)
            .flat_map(|element| element.text())
            .flat_map(str::split_whitespace)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Returns the first element matched by `selector`, if any
    pub fn select_first(&self, selector: &str) -> Option<ElementRef<'_>> {
        let selector = compile(selector)?;
        self.html.select(&selector).next()
    }
}

/// Collects the links matched by each selector, in selector order
///
/// Duplicates are kept; deduplication belongs to the walker.
pub fn links_for_selectors(document: &Document, selectors: &[String]) -> Vec<String> {
    selectors
        .iter()
        .flat_map(|selector| document.select_links(selector))
        .collect()
}

/// Returns the whitespace-normalized text of an element
pub fn element_text(element: &ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Compiles a selector string, logging and discarding invalid ones
fn compile(selector: &str) -> Option<Selector> {
    let selector = selector.trim();
    if selector.is_empty() {
        return None;
    }

    match Selector::parse(selector) {
        Ok(compiled) => Some(compiled),
        Err(e) => {
            tracing::debug!("Ignoring invalid selector '{}': {:?}", selector, e);
            None
        }
    }
}

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - fragment-only links
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
///
/// The fragment of the resolved URL is dropped, since it never changes the fetched page.
fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    if href.starts_with('#') {
        return None;
    }

    match base_url.join(href) {
        Ok(mut absolute_url) => {
            if absolute_url.scheme() == "http" || absolute_url.scheme() == "https" {
                absolute_url.set_fragment(None);
                Some(absolute_url.to_string())
            } else {
                None
            }
        }
        Err(_) => None,
    }
}
