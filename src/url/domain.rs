use url::Url;

/// Host name used when a base URL has no resolvable host
pub const UNKNOWN_SOURCE: &str = "unknown";

/// Extracts the domain from a URL
///
/// This function retrieves the host portion of a URL and converts it to lowercase.
/// If the URL has no host (e.g. `data:` or `file:` URLs), it returns None.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use newsmap_gatherer::url::extract_domain;
///
/// let url = Url::parse("https://EXAMPLE.COM/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Returns the article source name for a site's base URL
///
/// Falls back to `"unknown"` when the host cannot be resolved.
pub fn source_name(base_url: &Url) -> String {
    extract_domain(base_url).unwrap_or_else(|| UNKNOWN_SOURCE.to_string())
}

/// Returns the file-name suffix that keeps concurrent batch files apart
///
/// This is the full host, with `_<port>` appended when the URL carries an explicit
/// port, so two sites on the same host but different ports never collide.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use newsmap_gatherer::url::batch_suffix;
///
/// let url = Url::parse("https://www.bbc.co.uk/news").unwrap();
/// assert_eq!(batch_suffix(&url), "www.bbc.co.uk");
///
/// let url = Url::parse("http://127.0.0.1:8080/").unwrap();
/// assert_eq!(batch_suffix(&url), "127.0.0.1_8080");
/// ```
pub fn batch_suffix(url: &Url) -> String {
    let host = source_name(url);
    match url.port() {
        Some(port) => format!("{}_{}", host, port),
        None => host,
    }
}
