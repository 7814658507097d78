//! Configuration management for Tilawa.
//!
//! Configuration is read from `~/.config/tilawa/config.toml` at startup.
//! If the file doesn't exist, a default configuration with comments is created.

pub mod api;
pub mod reader;

pub use api::ApiConfig;
pub use reader::ReaderConfig;

use serde::Deserialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::fetcher::bulk::DEFAULT_WORKERS;

/// Main configuration struct.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub reader: ReaderConfig,
    pub download: DownloadConfig,
    pub brightness: BrightnessConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DownloadConfig {
    /// Concurrent requests when downloading everything for offline use
    pub workers: usize,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BrightnessConfig {
    /// Backlight device under /sys/class/backlight (first one when unset)
    pub device: Option<String>,
}

impl Config {
    /// Load configuration from the default path.
    ///
    /// If the config file doesn't exist, creates a default one with comments.
    /// If the config file exists but is invalid, returns an error.
    /// Missing fields in the config file will use default values.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::default_config_path()?;
        Self::load_from(&config_path)
    }

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

    /// Get the default config file path: `~/.config/tilawa/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("tilawa").join("config.toml"))
    }

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

    fn default_config_content() -> String {
        r##"# Tilawa Configuration

[api]
# alquran.cloud-compatible API root
quran_base_url = "https://api.alquran.cloud/v1"

# Edition requested for juz content
juz_edition = "quran-uthmani"

# Azkar dataset, either {"<category>": [items]} or [{categoryName, items}]
azkar_url = "https://raw.githubusercontent.com/nawafalqari/azkar-api/main/azkar.json"

# Request timeout in seconds
timeout_secs = 10

[reader]
# Scroll and verse positions are saved at most once per window (ms)
debounce_ms = 800

# Saved offsets at or below this are not offered for resume (px)
resume_threshold_px = 10.0

# Delay before jumping to a restored offset (ms)
restore_delay_ms = 800

# How long the restored verse stays highlighted (s)
highlight_secs = 10

# Bias added to the scroll offset when estimating the current verse (px)
verse_bias_px = 150.0

[download]
# Concurrent requests for `tilawa download`
workers = 10

[brightness]
# Backlight device under /sys/class/backlight; first device when unset
# device = "intel_backlight"
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
