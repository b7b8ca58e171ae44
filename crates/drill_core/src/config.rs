//! Session configuration
//!
//! Loaded from a JSON file named by `DRILL_CONFIG_PATH`; every field has a
//! default, so an absent variable or a partial file is fine.

use crate::clock::TICK_PERIOD_MS;
use crate::workshop::DEFAULT_STORAGE_KEY;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use std::{env, fs};

pub const CONFIG_PATH_ENV: &str = "DRILL_CONFIG_PATH";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Playback period in milliseconds
    pub tick_period_ms: u64,
    /// Key of the workshop collection
    pub storage_key: String,
    /// Directory for file-backed storage
    pub storage_dir: PathBuf,
    /// Fixed RNG seed for reproducible rolls; random when absent
    pub seed: Option<u64>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            tick_period_ms: TICK_PERIOD_MS,
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            storage_dir: PathBuf::from("workshops"),
            seed: None,
        }
    }
}

impl SessionConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.tick_period_ms == 0 {
            return Err("tick_period_ms must be greater than 0".to_string());
        }
        if self.storage_key.trim().is_empty() {
            return Err("storage_key must not be empty".to_string());
        }
        Ok(())
    }

    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_period_ms)
    }

    /// Defaults, overridden by the file at `DRILL_CONFIG_PATH` if set.
    pub fn from_env() -> Result<Self, String> {
        let Ok(path) = env::var(CONFIG_PATH_ENV) else {
            return Ok(Self::default());
        };

        let path = path.trim();
        if path.is_empty() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config from {CONFIG_PATH_ENV}='{path}': {e}"))?;

        let config = Self::from_json(&content)
            .map_err(|e| format!("Failed to parse config JSON from {CONFIG_PATH_ENV}='{path}': {e}"))?;

        config.validate().map_err(|e| format!("Invalid config from {CONFIG_PATH_ENV}='{path}': {e}"))?;

        log::debug!("Loaded session config from {}", path);
        Ok(config)
    }
}
