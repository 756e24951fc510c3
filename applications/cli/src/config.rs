//! Headless player configuration

use crate::error::{CliError, Result};
use encore_catalog::CatalogConfig;
use encore_playback::PlaybackConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const DEFAULT_CONFIG_FILE: &str = "encore.toml";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct EncoreConfig {
    /// Log filter used when `RUST_LOG` is not set
    #[serde(default)]
    pub log_level: Option<String>,

    #[serde(default)]
    pub catalog: CatalogConfig,

    #[serde(default)]
    pub playback: PlaybackConfig,

    #[serde(default)]
    pub simulator: SimulatorSettings,
}

/// Timing of the simulated platform player
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SimulatorSettings {
    /// Playback speed multiplier (2.0 plays a 30s preview in 15s)
    #[serde(default = "default_speed")]
    pub speed: f64,

    /// Delay between `prepare` and the prepared event
    #[serde(default = "default_prepare_delay_ms")]
    pub prepare_delay_ms: u64,

    /// Interval of position reports
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,

    /// Duration assumed for media without one
    #[serde(default = "default_fallback_duration_ms")]
    pub fallback_duration_ms: u64,
}

impl EncoreConfig {
    /// Load configuration from file and environment
    ///
    /// Reads `path` (which must exist) or, without one, `encore.toml` when
    /// present. `ENCORE_*` variables override both, with `__` between
    /// section and key (`ENCORE_CATALOG__PAGE_SIZE=50`).
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                settings = settings.add_source(config::File::from(path.to_path_buf()));
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        settings = settings.add_source(
            config::Environment::with_prefix("ENCORE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = settings
            .build()
            .map_err(|e| CliError::Config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| CliError::Config(e.to_string()))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.catalog.base_url.trim().is_empty() {
            return Err(CliError::Config(
                "Catalog URL is required (set ENCORE_CATALOG__BASE_URL)".to_string(),
            ));
        }

        if self.catalog.page_size == 0 {
            return Err(CliError::Config("catalog.page_size must be positive".into()));
        }

        if !(self.simulator.speed.is_finite() && self.simulator.speed > 0.0) {
            return Err(CliError::Config(format!(
                "simulator.speed must be positive, got {}",
                self.simulator.speed
            )));
        }

        if self.simulator.tick_ms == 0 {
            return Err(CliError::Config("simulator.tick_ms must be positive".into()));
        }

        Ok(())
    }
}

fn default_speed() -> f64 {
    1.0
}

fn default_prepare_delay_ms() -> u64 {
    150
}

fn default_tick_ms() -> u64 {
    250
}

fn default_fallback_duration_ms() -> u64 {
    30_000
}

impl Default for SimulatorSettings {
    fn default() -> Self {
        Self {
            speed: default_speed(),
            prepare_delay_ms: default_prepare_delay_ms(),
            tick_ms: default_tick_ms(),
            fallback_duration_ms: default_fallback_duration_ms(),
        }
    }
}
