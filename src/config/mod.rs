//! Configuration module - environment variable parsing

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::sim::SimulationSettings;
use crate::util::time::TICK_DURATION_MILLIS;

/// Application configuration loaded from environment variables
#[derive(Clone, Debug)]
pub struct Config {
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Emit logs as JSON lines instead of text
    pub log_json: bool,
    /// Tick period
    pub tick_interval: Duration,
    /// Publish a dashboard snapshot every N ticks
    pub snapshot_every: u32,
    /// JSON catalog file; the built-in catalog is used when unset
    pub catalog_path: Option<PathBuf>,
    /// Vehicle selected at startup; the catalog's first entry when unset
    pub initial_vehicle_id: Option<u32>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_json: false,
            tick_interval: Duration::from_millis(TICK_DURATION_MILLIS),
            snapshot_every: 1,
            catalog_path: None,
            initial_vehicle_id: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; unset keys fall back to defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        let defaults = Self::default();

        let tick_ms = parse_var(&lookup, "TICK_INTERVAL_MS")?
            .unwrap_or(TICK_DURATION_MILLIS);
        if tick_ms == 0 {
            return Err(ConfigError::Zero("TICK_INTERVAL_MS"));
        }

        let snapshot_every = parse_var(&lookup, "SNAPSHOT_EVERY")?.unwrap_or(defaults.snapshot_every);
        if snapshot_every == 0 {
            return Err(ConfigError::Zero("SNAPSHOT_EVERY"));
        }

        let log_json = match lookup("LOG_FORMAT").as_deref().map(str::trim) {
            None | Some("") | Some("text") => false,
            Some("json") => true,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    var: "LOG_FORMAT",
                    value: other.to_string(),
                })
            }
        };

        Ok(Self {
            log_level: lookup("LOG_LEVEL").unwrap_or(defaults.log_level),
            log_json,
            tick_interval: Duration::from_millis(tick_ms),
            snapshot_every,
            catalog_path: lookup("CATALOG_PATH")
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
            initial_vehicle_id: parse_var(&lookup, "INITIAL_VEHICLE_ID")?,
        })
    }

    pub fn simulation_settings(&self) -> SimulationSettings {
        SimulationSettings {
            tick_interval: self.tick_interval,
            snapshot_every: self.snapshot_every,
        }
    }
}

fn parse_var<F, T>(lookup: &F, var: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&'static str) -> Option<String>,
    T: FromStr,
{
    let Some(value) = lookup(var) else {
        return Ok(None);
    };
    let parsed = value.trim().parse::<T>();
    parsed
        .map(Some)
        .map_err(|_| ConfigError::Invalid { var, value })
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value {value:?} for environment variable {var}")]
    Invalid { var: &'static str, value: String },

    #[error("Environment variable {0} must be greater than zero")]
    Zero(&'static str),
}
