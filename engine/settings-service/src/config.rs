//! Configuration for the settings stores

use crate::error::{Result, SettingsServiceError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

/// Which store backs the resolver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreKind {
    /// Process-local, lost on exit
    Memory,
    /// One JSON file per scope under `data_dir`
    Local,
}

impl FromStr for StoreKind {
    type Err = SettingsServiceError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" | "in_memory" => Ok(StoreKind::Memory),
            "local" | "file" => Ok(StoreKind::Local),
            other => Err(SettingsServiceError::config(format!("unknown store kind '{}'", other))),
        }
    }
}

/// Configuration for the settings service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsServiceConfig {
    pub store: StoreKind,

    /// Base directory for the local store
    pub data_dir: PathBuf,

    /// Write the calibrated default row when the store has none
    pub seed_default: bool,
}

impl Default for SettingsServiceConfig {
    fn default() -> Self {
        Self { store: StoreKind::Local, data_dir: PathBuf::from("./data/settings"), seed_default: true }
    }
}

impl SettingsServiceConfig {
    /// Create a local-store configuration rooted at `data_dir`
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self { data_dir: data_dir.into(), ..Default::default() }
    }

    pub fn in_memory() -> Self {
        Self { store: StoreKind::Memory, ..Default::default() }
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        if let Ok(kind) = std::env::var("VALUATION_STORE") {
            config.store = kind.parse()?;
        }
        if let Ok(dir) = std::env::var("VALUATION_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }
        if let Ok(seed) = std::env::var("VALUATION_SEED_DEFAULT") {
            config.seed_default = seed
                .parse()
                .map_err(|_| SettingsServiceError::config(format!("VALUATION_SEED_DEFAULT '{}' is not a bool", seed)))?;
        }
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.store == StoreKind::Local && self.data_dir.as_os_str().is_empty() {
            return Err(SettingsServiceError::config("data_dir must be set for the local store"));
        }
        Ok(())
    }
}
