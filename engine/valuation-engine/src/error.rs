//! Error types for the valuation engine

use thiserror::Error;

/// Result type for valuation engine operations
pub type Result<T> = std::result::Result<T, ValuationError>;

/// Errors that can occur while valuing players and picks.
///
/// Out-of-range ages, ratings and pick numbers are never errors: every
/// numeric function clamps into its calibrated domain instead. Errors are
/// reserved for requests with the wrong shape.
#[derive(Error, Debug)]
pub enum ValuationError {
    /// Missing, wrong-typed or out-of-contract request values
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The requested calculation is switched off in the active settings
    #[error("Feature disabled: {0}")]
    FeatureDisabled(&'static str),

    /// Serialization errors when rendering settings or results
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ValuationError {
    /// Create a new invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Whether this error describes a bad request rather than a failure
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }
}
