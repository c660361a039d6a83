//! Configuration management for pricetrack.
//!
//! Configuration is read from `~/.config/pricetrack/config.toml` at startup.
//! If the file doesn't exist, a default configuration with comments is created.

use crate::browser::ScraperConfig;
use crate::extractor::SelectorConfig;
use serde::Deserialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Main configuration struct.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub scraper: ScraperConfig,
    pub selectors: SelectorConfig,
    pub dataset: DatasetConfig,
}

/// Where records are stored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    /// SQLite file; defaults to `<data dir>/pricetrack/dataset.db`
    pub path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from the default path.
    ///
    /// If the config file doesn't exist, creates a default one with comments.
    /// If the config file exists but is invalid, returns an error.
    /// Missing fields in the config file will use default values.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::default_config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
            return Ok(Self::default());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from an explicit path. The file must exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Get the default config file path: `~/.config/pricetrack/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("pricetrack").join("config.toml"))
    }

    /// Create a default config file with comments.
    fn create_default_config(path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let mut file = fs::File::create(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        file.write_all(Self::default_config_content().as_bytes())
            .map_err(|e| ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;

        Ok(())
    }

    /// Generate the default config file content with comments.
    fn default_config_content() -> String {
        r##"# pricetrack configuration

[scraper]
# Page engine: "chrome" renders pages in headless Chrome,
# "http" fetches server HTML without running scripts
engine = "chrome"

# Run browser in headless mode (no visible window)
headless = true

# Page load timeout in seconds
timeout_secs = 30

# Network quiet period before a page counts as loaded (milliseconds)
wait_after_load_ms = 1000

# Maximum concurrent page visits
max_concurrency = 5

# Selector chains are tried in order; the first non-empty value wins.
# Entries are CSS selectors, or tables with an explicit read kind:
#   { selector = "#avg", read = { attr = "title" } }
#   { selector = "img.hero", read = "src" }
[selectors]
title = [
    "#productTitle",
    "h1.a-size-large",
    ".product-title",
    "h1",
]
price = [
    ".a-price .a-offscreen",
    ".a-price-whole",
    "#priceblock_dealprice",
    "#priceblock_ourprice",
    ".a-price.a-text-price.a-size-medium.apexPriceToPay .a-offscreen",
    ".a-price-range .a-offscreen",
    ".a-price.a-text-price .a-offscreen",
]
image = [
    "#landingImage",
    ".a-dynamic-image",
    "#imgTagWrapperId img",
    ".a-button-thumbnail img",
]
rating = [
    ".a-icon-alt",
    '[data-hook="rating-out-of-text"]',
    "#acrCustomerReviewText",
]

[dataset]
# SQLite file holding run records (default: <data dir>/pricetrack/dataset.db)
# path = "/var/lib/pricetrack/dataset.db"
"##
        .to_string()
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to read/write config file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::Engine;

    #[test]
    fn test_default_config_deserializes() {
        let content = Config::default_config_content();
        let config: Config = toml::from_str(&content).expect("Default config should be valid TOML");

        assert_eq!(config.scraper.engine, Engine::Chrome);
        assert_eq!(config.scraper.max_concurrency, 5);
        // The commented file mirrors the built-in chains
        assert_eq!(config.selectors, SelectorConfig::default());
        assert!(config.dataset.path.is_none());
    }

    #[test]
    fn test_partial_config() {
        let content = r##"
[scraper]
engine = "http"
timeout_secs = 10

[selectors]
title = ["h2.product-name"]
"##;
        let config: Config = toml::from_str(content).expect("Partial config should work");

        assert_eq!(config.scraper.engine, Engine::Http);
        assert_eq!(config.scraper.timeout_secs, 10);
        assert_eq!(config.scraper.wait_after_load_ms, 1000);
        assert_eq!(config.selectors.title.len(), 1);
        assert_eq!(config.selectors.price, SelectorConfig::default().price);
    }

    #[test]
    fn test_empty_config() {
        let config: Config = toml::from_str("").expect("Empty config should work");
        assert_eq!(config.scraper.timeout_secs, 30);
        assert_eq!(config.selectors, SelectorConfig::default());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[dataset]\npath = \"/tmp/records.db\"\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.dataset.path, Some(PathBuf::from("/tmp/records.db")));
    }

    #[test]
    fn test_load_from_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load_from(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_invalid_toml_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[scraper\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("config.toml"));
    }
}
