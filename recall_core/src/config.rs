//! Configuration file support for Recall.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/recall/config.toml`.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub scheduler: SchedulerConfig,

    #[serde(default)]
    pub review: ReviewConfig,
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

/// Intervals (in minutes) assigned on the first successful rating
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SchedulerConfig {
    #[serde(default = "default_good_first_interval")]
    pub good_first_interval: u32,

    #[serde(default = "default_easy_first_interval")]
    pub easy_first_interval: u32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            good_first_interval: default_good_first_interval(),
            easy_first_interval: default_easy_first_interval(),
        }
    }
}

/// Review session behaviour
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReviewConfig {
    #[serde(default = "default_log_reviews")]
    pub log_reviews: bool,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            log_reviews: default_log_reviews(),
        }
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));
    base.join("recall")
}

fn default_good_first_interval() -> u32 {
    10
}

fn default_easy_first_interval() -> u32 {
    20
}

fn default_log_reviews() -> bool {
    true
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        match Self::default_config_path() {
            Some(config_path) if config_path.exists() => Self::load_from(&config_path),
            Some(config_path) => {
                tracing::info!(
                    "No config file found at {:?}, using defaults",
                    config_path
                );
                Ok(Self::default())
            }
            None => {
                tracing::info!("No config directory available, using defaults");
                Ok(Self::default())
            }
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
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|base| base.join("recall").join("config.toml"))
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }

    /// Reject values the scheduler cannot use
    pub fn validate(&self) -> Result<()> {
        if self.scheduler.good_first_interval == 0 || self.scheduler.easy_first_interval == 0 {
            return Err(Error::Config(
                "first-success intervals must be at least one minute".into(),
            ));
        }
        Ok(())
    }
}
