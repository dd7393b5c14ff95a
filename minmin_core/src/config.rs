//! Configuration file support for minmin.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/minmin/config.toml`.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub recommendation: RecommendationConfig,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Sleep recommendation parameters
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RecommendationConfig {
    /// Hours recommended when the trailing average is at or above it
    #[serde(default = "default_baseline_hours")]
    pub baseline_hours: f64,

    /// Days before today included in the trailing average (today is always included)
    #[serde(default = "default_window_days")]
    pub window_days: u32,
}

impl Default for RecommendationConfig {
    fn default() -> Self {
        Self {
            baseline_hours: default_baseline_hours(),
            window_days: default_window_days(),
        }
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));
    base.join("minmin")
}

fn default_baseline_hours() -> f64 {
    8.0
}

fn default_window_days() -> u32 {
    7
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
            .unwrap_or_else(|| PathBuf::from("."));
        base.join("minmin").join("config.toml")
    }

    /// Reject values the recommendation engine cannot work with
    pub fn validate(&self) -> Result<()> {
        let rec = &self.recommendation;
        if !rec.baseline_hours.is_finite() || rec.baseline_hours <= 0.0 || rec.baseline_hours > 24.0
        {
            return Err(Error::Config(format!(
                "recommendation.baseline_hours must be in (0, 24], got {}",
                rec.baseline_hours
            )));
        }
        if rec.window_days == 0 {
            return Err(Error::Config(
                "recommendation.window_days must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }

    /// Path of the record snapshot inside the data directory
    pub fn records_path(data_dir: &Path) -> PathBuf {
        data_dir.join("records.json")
    }
}
