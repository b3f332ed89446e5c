//! Application configuration
//!
//! Read from `config.json` in the XDG config directory
//! (`~/.config/newsweather/` on Linux). Every section falls back to its
//! defaults, so a partial file is fine and a missing one means "all defaults".

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

use crate::data::news::{DEFAULT_TOPIC, NEWS_API_BASE_URL};
use crate::data::weather::WEATHER_API_BASE_URL;
use crate::data::{Coordinates, TemperatureUnit};
use crate::fetcher::ResultOrdering;
use crate::location::{DEFAULT_LATITUDE, DEFAULT_LONGITUDE, DEFAULT_LOCATION_TIMEOUT};
use crate::settings::{Settings, Theme};

/// Environment variable overriding `news.api_key`
pub const NEWS_API_KEY_ENV: &str = "NEWSWEATHER_NEWS_API_KEY";

/// Environment variable overriding `weather.api_key`
pub const WEATHER_API_KEY_ENV: &str = "NEWSWEATHER_WEATHER_API_KEY";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot determine the configuration directory")]
    NoConfigDir,

    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub news: NewsConfig,
    pub weather: WeatherConfig,
    pub location: LocationConfig,
    pub fetch: FetchConfig,
    pub display: DisplayConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewsConfig {
    pub api_key: String,
    pub base_url: String,
    /// Query used when the search box is empty
    pub default_topic: String,
    pub language: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    pub api_key: String,
    pub base_url: String,
    /// Keep the last reading for offline display
    pub persist_snapshot: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationConfig {
    /// Coordinate used when the device position is unavailable
    pub fallback: Coordinates,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Drop results of loads that were superseded by a newer, already applied one
    pub discard_superseded: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Theme until the user picks one
    pub theme: Theme,
    /// Unit until the user picks one
    pub units: TemperatureUnit,
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: NEWS_API_BASE_URL.to_string(),
            default_topic: DEFAULT_TOPIC.to_string(),
            language: "en".to_string(),
        }
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: WEATHER_API_BASE_URL.to_string(),
            persist_snapshot: true,
        }
    }
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            fallback: Coordinates::new(DEFAULT_LATITUDE, DEFAULT_LONGITUDE),
            timeout_secs: DEFAULT_LOCATION_TIMEOUT.as_secs(),
        }
    }
}

impl LocationConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl FetchConfig {
    pub fn ordering(&self) -> ResultOrdering {
        if self.discard_superseded {
            ResultOrdering::LastIssued
        } else {
            ResultOrdering::LastCompleted
        }
    }
}

impl DisplayConfig {
    pub fn settings(&self) -> Settings {
        Settings {
            theme: self.theme,
            units: self.units,
        }
    }
}

impl Config {
    /// Default location of the configuration file
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let dirs = ProjectDirs::from("", "", "newsweather").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.config_dir().join("config.json"))
    }

    /// Loads configuration from `path` (or the default path), then applies environment overrides
    ///
    /// A missing file yields defaults. An unreadable or malformed file is
    /// logged and also yields defaults.
    pub fn load(path: Option<&Path>) -> Self {
        let path = match path {
            Some(p) => Some(p.to_path_buf()),
            None => Self::default_path()
                .map_err(|err| warn!(error = %err, "using default configuration"))
                .ok(),
        };

        let mut config = match path {
            Some(ref p) if p.exists() => Self::load_from_file(p).unwrap_or_else(|err| {
                warn!(path = %p.display(), error = %err, "using default configuration");
                Self::default()
            }),
            _ => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        config
    }

    /// Parses a configuration file
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Applies API key overrides from the environment
    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(key) = lookup(NEWS_API_KEY_ENV).filter(|k| !k.is_empty()) {
            self.news.api_key = key;
        }
        if let Some(key) = lookup(WEATHER_API_KEY_ENV).filter(|k| !k.is_empty()) {
            self.weather.api_key = key;
        }
    }
}
