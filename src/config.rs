//! Player configuration loaded from TOML.

use std::path::{Path, PathBuf};
use std::time::Duration;
use serde::{Deserialize, Serialize};
use crate::input::scrub::RateSlider;

/// Error type for configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Unit of the position handed to the frame callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionUnit {
    /// Frame index
    Frames,
    /// Frame index divided by frames per second
    Seconds,
}

/// Playback settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Polling period of the host timer
    pub tick_interval_ms: u64,
    /// Initial speed in percent of normal, as on the rate slider
    pub rate_percent: u32,
    /// Start playing as soon as the video is opened
    pub autoplay: bool,
    pub position: PositionUnit,
    /// Half-width of the chart window around the cursor (seconds)
    pub chart_window_secs: f64,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 5,
            rate_percent: 100,
            autoplay: true,
            position: PositionUnit::Seconds,
            chart_window_secs: 15.0,
        }
    }
}

impl PlayerConfig {
    /// Load and validate a config file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        log::debug!("Loaded config from {:?}: {:?}", path, config);
        Ok(config)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::Invalid("tick_interval_ms must be at least 1".to_string()));
        }
        if self.rate_percent > RateSlider::MAX_PERCENT {
            return Err(ConfigError::Invalid(format!(
                "rate_percent {} exceeds {}",
                self.rate_percent,
                RateSlider::MAX_PERCENT
            )));
        }
        if !(self.chart_window_secs.is_finite() && self.chart_window_secs > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "chart_window_secs must be positive, got {}",
                self.chart_window_secs
            )));
        }
        Ok(())
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Initial playback rate multiplier
    pub fn initial_rate(&self) -> f64 {
        RateSlider::to_multiplier(self.rate_percent)
    }
}
