use crate::config::types::{
    CrawlerConfig, OutputConfig, OutputFormat, RunConfig, SiteDefinition, UserAgentConfig,
};
use crate::ConfigError;
use scraper::Selector;
use url::Url;

/// Validates the entire run configuration
pub fn validate(config: &RunConfig) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;

    if config.sites.config_dir.trim().is_empty() {
        return Err(ConfigError::Validation(
            "sites config_dir cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_articles < 1 {
        return Err(ConfigError::Validation(format!(
            "max_articles must be >= 1, got {}",
            config.max_articles
        )));
    }

    if let Some(max) = config.max_concurrent_sites {
        if !(1..=100).contains(&max) {
            return Err(ConfigError::Validation(format!(
                "max_concurrent_sites must be between 1 and 100, got {}",
                max
            )));
        }
    }

    if config.fetch_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "fetch_timeout_secs must be >= 1, got {}",
            config.fetch_timeout_secs
        )));
    }

    if config.run_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "run_timeout_secs must be >= 1, got {}",
            config.run_timeout_secs
        )));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    // Crawler name doubles as the robots.txt product token: alphanumeric + hyphens only
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    if config.crawler_version.trim().is_empty() {
        return Err(ConfigError::Validation(
            "crawler_version cannot be empty".to_string(),
        ));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;

    validate_email(&config.contact_email)?;

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.article_dir.trim().is_empty() {
        return Err(ConfigError::Validation(
            "article_dir cannot be empty".to_string(),
        ));
    }

    if config.format == OutputFormat::Parquet {
        return Err(ConfigError::Validation(
            "output format 'parquet' is reserved but not supported yet; use json or jsonl"
                .to_string(),
        ));
    }

    Ok(())
}

/// Validates a site definition and returns its parsed base URL
pub fn validate_site_definition(definition: &SiteDefinition) -> Result<Url, ConfigError> {
    let base_url = Url::parse(definition.base_url.trim()).map_err(|e| {
        ConfigError::InvalidUrl(format!("Invalid baseUrl '{}': {}", definition.base_url, e))
    })?;

    if base_url.scheme() != "http" && base_url.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "baseUrl '{}' must use http or https",
            definition.base_url
        )));
    }

    if base_url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "baseUrl '{}' has no host",
            definition.base_url
        )));
    }

    let selectors = definition
        .topic_selectors
        .iter()
        .chain(definition.article_selectors.iter())
        .chain([
            &definition.article_title,
            &definition.article_time,
            &definition.article_body,
        ]);

    for selector in selectors {
        validate_selector(selector)?;
    }

    Ok(base_url)
}

/// Checks that a non-empty selector compiles
///
/// Empty selectors are allowed; they simply match nothing.
fn validate_selector(selector: &str) -> Result<(), ConfigError> {
    let trimmed = selector.trim();
    if trimmed.is_empty() {
        return Ok(());
    }

    Selector::parse(trimmed)
        .map(|_| ())
        .map_err(|e| ConfigError::InvalidSelector {
            selector: selector.to_string(),
            message: format!("{:?}", e),
        })
}

/// Basic email validation
fn validate_email(email: &str) -> Result<(), ConfigError> {
    if email.is_empty() {
        return Err(ConfigError::Validation(
            "contact_email cannot be empty".to_string(),
        ));
    }

    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    let local = parts[0];
    let domain = parts[1];

    if local.is_empty() || domain.is_empty() {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    if !domain.contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid email domain: '{}'",
            email
        )));
    }

    Ok(())
}
