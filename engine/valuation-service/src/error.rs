//! Error types for the valuation service

use settings_service::SettingsServiceError;
use thiserror::Error;
use valuation_engine::ValuationError;

/// Result type alias for service operations
pub type Result<T> = std::result::Result<T, ServiceError>;

/// Errors surfaced to service callers
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Bad requests and disabled features
    #[error(transparent)]
    Valuation(#[from] ValuationError),

    /// Settings lookups, patches and storage
    #[error(transparent)]
    Settings(#[from] SettingsServiceError),
}

impl ServiceError {
    /// Whether the request itself was malformed
    pub fn is_invalid_input(&self) -> bool {
        match self {
            Self::Valuation(e) => e.is_invalid_input(),
            Self::Settings(e) => e.is_invalid_input(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Settings(e) if e.is_not_found())
    }

    pub fn is_feature_disabled(&self) -> bool {
        matches!(self, Self::Valuation(ValuationError::FeatureDisabled(_)))
    }
}
