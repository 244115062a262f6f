//! Valuation Service Library
//!
//! Configuration, logging and the [`ValuationService`] facade behind the
//! `valuation` command-line tool.

use anyhow::{Context, Result};
use std::path::Path;

pub mod config;
pub mod error;
pub mod logging;
pub mod service;

pub use config::ServiceConfig;
pub use error::ServiceError;
pub use logging::initialize_logging;
pub use service::ValuationService;

/// Load configuration from an optional file and environment variables
pub fn load_configuration(file: Option<&Path>) -> Result<ServiceConfig> {
    config::load_config(file).context("Failed to load service configuration")
}
