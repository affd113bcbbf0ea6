use crate::config::types::{RunConfig, SiteDefinition};
use crate::config::validation::{validate, validate_site_definition};
use crate::ConfigError;
use std::path::{Path, PathBuf};
use url::Url;

/// Loads and parses a run configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(RunConfig)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use newsmap_gatherer::config::load_config;
///
/// let config = load_config(Path::new("gatherer.toml")).unwrap();
/// println!("Budget per site: {}", config.crawler.max_articles);
/// ```
pub fn load_config(path: &Path) -> Result<RunConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parses and validates run configuration from TOML text
pub fn parse_config(content: &str) -> Result<RunConfig, ConfigError> {
    let config: RunConfig = toml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}

/// Lists the site definition files in a directory
///
/// Only `*.json` files are returned, sorted by file name so runs are reproducible.
///
/// # Returns
///
/// * `Ok(Vec<PathBuf>)` - The definition files (possibly none)
/// * `Err(ConfigError::MissingDirectory)` - The directory does not exist
pub fn list_site_files(dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    if !dir.is_dir() {
        return Err(ConfigError::MissingDirectory(dir.display().to_string()));
    }

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let is_json = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);
        if path.is_file() && is_json {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}

/// Loads and validates one site definition file
///
/// # Returns
///
/// * `Ok((SiteDefinition, Url))` - The definition and its parsed base URL
/// * `Err(ConfigError)` - The file could not be read, parsed, or validated
pub fn load_site_definition(path: &Path) -> Result<(SiteDefinition, Url), ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let definition: SiteDefinition = serde_json::from_str(&content)?;
    let base_url = validate_site_definition(&definition)?;
    Ok((definition, base_url))
}
