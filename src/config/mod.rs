//! Configuration management for platescout.
//!
//! Configuration is read from `~/.config/platescout/config.toml` at startup.
//! If the file doesn't exist, a default configuration with comments is created.

use crate::pipeline::PipelineConfig;
use crate::scraper::ScraperConfig;
use crate::sources::SourcesConfig;
use serde::Deserialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Main configuration struct.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub scraper: ScraperConfig,
    pub pipeline: PipelineConfig,
    pub sources: SourcesConfig,
}

impl Config {
    /// Load configuration from the default path.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::default_config_path()?)
    }

    /// Load configuration from `config_path`.
    ///
    /// If the config file doesn't exist, creates a default one with comments.
    /// If the config file exists but is invalid, returns an error.
    /// Missing fields in the config file will use default values.
    pub fn load_from(config_path: &Path) -> Result<Self, ConfigError> {
        if !config_path.exists() {
            Self::create_default_config(config_path)?;
            return Ok(Self::default());
        }

        let content = fs::read_to_string(config_path).map_err(|e| ConfigError::Io {
            path: config_path.to_path_buf(),
            source: e,
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: config_path.to_path_buf(),
            source: e,
        })?;

        Ok(config)
    }

    /// Get the default config file path: `~/.config/platescout/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("platescout").join("config.toml"))
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
        r##"# platescout configuration
#
# Sources: "google_maps", "swiggy", "zomato", "magicpin"

[scraper]
# Run browser in headless mode (no visible window)
headless = true

# Page navigation timeout in seconds
timeout_secs = 30

# How long to wait for a page element before giving up (seconds)
wait_timeout_secs = 10

# Interval between element presence checks (milliseconds)
poll_interval_ms = 250

# Pause after submitting a search, for results to render (milliseconds)
settle_ms = 2000

# Pause for pages without a reliable marker element (milliseconds)
render_wait_ms = 5000

# Extra Chrome command-line arguments
browser_args = [
    "--no-sandbox",
    "--disable-gpu",
    "--disable-dev-shm-usage",
    "--disable-software-rasterizer",
]

[pipeline]
# Restaurant names to process, in order
restaurants = []

# Delivery sites compared by `platescout compare`, in order
sources = ["swiggy", "zomato", "magicpin"]

# Source whose menu the join starts from
anchor = "swiggy"

# Which menu items survive the join:
# - "require_all": listed by every source; a failed source empties the menu
# - "require_available": listed by every source that was extracted
# - "require_any": listed by at least one source
# - "anchor_only": every item of the anchor source
inclusion = "require_all"

# Extra attempts when a delivery page yields no menu
max_retries = 3

# Extra attempts when a map page yields no reviews
maps_max_retries = 4

# Minimum name similarity (0-100) for a map search result to count as a match
min_match_score = 0

[sources]
google_maps_url = "https://www.google.co.in/maps/@12.962000,77.597038,15z?entry=ttu"
swiggy_url = "https://www.swiggy.com/search"
zomato_url = "https://www.zomato.com/bangalore/delivery-in-shanti-nagar"

# Known Magicpin restaurant pages. A restaurant matches the first URL
# containing its name with spaces replaced by dashes.
magicpin_urls = []
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
