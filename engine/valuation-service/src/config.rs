//! Service configuration management
//!
//! Layers, lowest first: built-in defaults (with the store's own
//! `VALUATION_STORE` / `VALUATION_DATA_DIR` variables applied), an optional
//! TOML file, then `VALUATION__SECTION__KEY` environment variables.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use settings_service::SettingsServiceConfig;
use std::path::{Path, PathBuf};

/// Environment prefix for layered overrides
pub const ENV_PREFIX: &str = "VALUATION";

/// Main service configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Settings store configuration
    pub settings: SettingsServiceConfig,

    /// Logging configuration
    pub logging: LoggingConfig,

    /// Output configuration
    pub output: OutputConfig,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error); `RUST_LOG` takes precedence
    pub level: String,

    /// Log format (json, pretty, compact)
    pub format: String,
}

/// How command results are printed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Pretty-print JSON results
    pub pretty: bool,

    /// Franchise used when a command names none
    pub franchise_id: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "warn".to_string(), format: "compact".to_string() }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { pretty: true, franchise_id: None }
    }
}

impl ServiceConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file: {:?}", path))?;
        let config: ServiceConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse configuration file: {:?}", path))?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;
        std::fs::write(path, content).with_context(|| format!("Failed to write configuration file: {:?}", path))?;
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.settings.validate().context("Invalid settings store configuration")?;

        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => return Err(anyhow::anyhow!("Invalid log level: {}", self.logging.level)),
        }

        match self.logging.format.as_str() {
            "json" | "pretty" | "compact" => {}
            _ => return Err(anyhow::anyhow!("Invalid log format: {}", self.logging.format)),
        }

        Ok(())
    }
}

/// Load configuration from defaults, an optional file and environment variables
pub fn load_config(file: Option<&Path>) -> Result<ServiceConfig> {
    let defaults = ServiceConfig {
        settings: SettingsServiceConfig::from_env().context("Failed to read store environment")?,
        ..ServiceConfig::default()
    };

    let mut builder = config::Config::builder()
        .add_source(config::Config::try_from(&defaults).context("Failed to encode default configuration")?);

    if let Some(path) = file {
        if !path.exists() {
            return Err(anyhow::anyhow!("Configuration file not found: {:?}", path));
        }
        tracing::debug!("Loading configuration from file: {:?}", path);
        builder = builder.add_source(config::File::from(PathBuf::from(path)));
    }

    let config: ServiceConfig = builder
        .add_source(config::Environment::with_prefix(ENV_PREFIX).prefix_separator("__").separator("__"))
        .build()
        .context("Failed to assemble configuration")?
        .try_deserialize()
        .context("Failed to deserialize configuration")?;

    config.validate()?;
    Ok(config)
}
