//! Configuration management with TOML, environment variables, and CLI overrides.

use crate::extract::ExtractLimits;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Application configuration with layered loading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Proxy URL (e.g., socks5://host:port) for the fetcher
    #[serde(default)]
    pub proxy: Option<String>,

    /// Base delay before a fetch in milliseconds
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,

    /// Random jitter added to the delay (0 to this value)
    #[serde(default = "default_delay_jitter_ms")]
    pub delay_jitter_ms: u64,

    /// Accept-Language header sent with fetches
    #[serde(default = "default_accept_language")]
    pub accept_language: String,

    /// Output format
    #[serde(default)]
    pub format: OutputFormat,

    /// Cap on extracted images
    #[serde(default = "default_max_images")]
    pub max_images: usize,

    /// Cap on extracted videos
    #[serde(default = "default_max_videos")]
    pub max_videos: usize,

    /// Cap on extracted reviews (summary entry included)
    #[serde(default = "default_max_reviews")]
    pub max_reviews: usize,

    /// Ceiling on synthesized variant combinations
    #[serde(default = "default_max_combinations")]
    pub max_combinations: usize,
}

fn default_delay_ms() -> u64 {
    2000
}

fn default_delay_jitter_ms() -> u64 {
    3000
}

fn default_accept_language() -> String {
    "en-US,en;q=0.9,fr;q=0.8".to_string()
}

fn default_max_images() -> usize {
    crate::model::MAX_IMAGES
}

fn default_max_videos() -> usize {
    crate::model::MAX_VIDEOS
}

fn default_max_reviews() -> usize {
    crate::model::MAX_REVIEWS
}

fn default_max_combinations() -> usize {
    crate::variants::DEFAULT_MAX_COMBINATIONS
}

impl Default for Config {
    fn default() -> Self {
        Self {
            proxy: None,
            delay_ms: default_delay_ms(),
            delay_jitter_ms: default_delay_jitter_ms(),
            accept_language: default_accept_language(),
            format: OutputFormat::Table,
            max_images: default_max_images(),
            max_videos: default_max_videos(),
            max_reviews: default_max_reviews(),
            max_combinations: default_max_combinations(),
        }
    }
}

impl Config {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading config from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Loads configuration with fallback to default locations.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        // 1. Explicit path takes precedence
        if let Some(path) = explicit_path {
            return Self::from_file(path);
        }

        // 2. Try current directory
        let local_config = Path::new("config.toml");
        if local_config.exists() {
            debug!("Found config.toml in current directory");
            return Self::from_file(local_config);
        }

        // 3. Try XDG config directory
        if let Some(config_dir) = dirs::config_dir() {
            let xdg_config = config_dir.join("shop-extract").join("config.toml");
            if xdg_config.exists() {
                debug!("Found config in XDG config directory");
                return Self::from_file(xdg_config);
            }
        }

        // 4. Return default config
        debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Applies environment variable overrides.
    pub fn with_env(mut self) -> Self {
        if let Ok(proxy) = std::env::var("SHOPX_PROXY") {
            self.proxy = Some(proxy);
        }

        if let Ok(delay) = std::env::var("SHOPX_DELAY") {
            if let Ok(d) = delay.parse() {
                self.delay_ms = d;
            }
        }

        if let Ok(format) = std::env::var("SHOPX_FORMAT") {
            if let Ok(f) = format.parse() {
                self.format = f;
            }
        }

        self
    }

    /// Collection ceilings for the extraction pipeline.
    pub fn limits(&self) -> ExtractLimits {
        ExtractLimits {
            max_images: self.max_images,
            max_videos: self.max_videos,
            max_reviews: self.max_reviews,
            max_combinations: self.max_combinations,
        }
    }
}

/// Output format for extracted records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Markdown,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            _ => Err(format!("Unknown format: {}. Use: table, json, markdown", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Markdown => write!(f, "markdown"),
        }
    }
}
