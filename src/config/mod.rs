//! Configuration management
//!
//! A plain, immutable settings structure. It is loaded from TOML (or built
//! from defaults), validated once, and then shared read-only: every session
//! takes an `Arc` snapshot at acquisition time and never sees later updates.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub mod types;

pub use types::{
    DelayConfig, InterpolationConfig, LoggingConfig, WindMouseConfig, MIN_INTERPOLATION_DISTANCE,
    MIN_STEP_SIZE,
};

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HumanizerConfig {
    /// Master switch; a disabled humanizer hands out no sessions
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Pacing around actions
    #[serde(default)]
    pub delay: DelayConfig,
    /// Linear interpolation movement
    #[serde(default)]
    pub interpolation: InterpolationConfig,
    /// WindMouse movement
    #[serde(default)]
    pub wind_mouse: WindMouseConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_enabled() -> bool {
    true
}

impl Default for HumanizerConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            delay: DelayConfig::default(),
            interpolation: InterpolationConfig::default(),
            wind_mouse: WindMouseConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl HumanizerConfig {
    /// Load configuration from file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml_str(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    /// Parse and validate TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: HumanizerConfig =
            toml::from_str(content).context("Failed to parse config")?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.delay.validate()?;
        self.interpolation.validate()?;
        self.wind_mouse.validate()
    }
}
