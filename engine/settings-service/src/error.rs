//! Error types for the settings service

use thiserror::Error;
use valuation_engine::ValuationError;

/// Result type alias for settings operations
pub type Result<T> = std::result::Result<T, SettingsServiceError>;

/// Errors that can occur while resolving or storing settings
#[derive(Error, Debug)]
pub enum SettingsServiceError {
    /// Neither the requested scope nor the default row exists
    #[error("Settings not found: {scope}")]
    NotFound { scope: String },

    /// I/O errors from the file store
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Rejected patches, invalid settings trees
    #[error(transparent)]
    Valuation(#[from] ValuationError),

    /// Franchise ids that cannot name a settings row
    #[error("Invalid scope: {0}")]
    InvalidScope(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

impl SettingsServiceError {
    /// Create a new not found error
    pub fn not_found(scope: impl Into<String>) -> Self {
        Self::NotFound { scope: scope.into() }
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new invalid scope error
    pub fn invalid_scope(msg: impl Into<String>) -> Self {
        Self::InvalidScope(msg.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Whether the caller sent a request the service cannot accept
    pub fn is_invalid_input(&self) -> bool {
        match self {
            Self::InvalidScope(_) => true,
            Self::Valuation(e) => e.is_invalid_input(),
            _ => false,
        }
    }
}
