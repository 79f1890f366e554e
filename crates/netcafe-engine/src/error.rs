//! # Engine Error Types
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Engine Error Categories                            │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Business rule  │  │   Persistence   │  │     Configuration       │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  Core(CoreError)│  │ Store(StoreErr) │  │  InvalidConfig          │ │
//! │  │  Auth, Occupancy│  │ passed through  │  │  ConfigLoadFailed       │ │
//! │  │  Insufficient.. │  │ unmodified      │  │  ConfigSaveFailed       │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The engine never retries. A `Store` error means the in-memory claims
//! made by the failing operation were rolled back (login) or that the
//! in-memory state is already committed and persistence lagged (logout).

use netcafe_core::{CoreError, ValidationError};
use netcafe_store::StoreError;
use thiserror::Error;

/// Result type alias for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

#[derive(Debug, Error)]
pub enum EngineError {
    // =========================================================================
    // Business Rule Errors
    // =========================================================================
    /// A domain rule rejected the operation. Nothing was changed.
    #[error(transparent)]
    Core(#[from] CoreError),

    // =========================================================================
    // Persistence Errors
    // =========================================================================
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    // =========================================================================
    // Configuration Errors
    // =========================================================================
    #[error("Invalid engine configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<ValidationError> for EngineError {
    fn from(err: ValidationError) -> Self {
        EngineError::Core(CoreError::Validation(err))
    }
}

impl From<std::io::Error> for EngineError {
    fn from(err: std::io::Error) -> Self {
        EngineError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for EngineError {
    fn from(err: toml::de::Error) -> Self {
        EngineError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for EngineError {
    fn from(err: toml::ser::Error) -> Self {
        EngineError::ConfigSaveFailed(err.to_string())
    }
}

// =============================================================================
// Error Classification
// =============================================================================

impl EngineError {
    /// The domain error, if this is one.
    pub fn core_error(&self) -> Option<&CoreError> {
        match self {
            EngineError::Core(err) => Some(err),
            _ => None,
        }
    }

    /// The store error, if this is one.
    pub fn store_error(&self) -> Option<&StoreError> {
        match self {
            EngineError::Store(err) => Some(err),
            _ => None,
        }
    }

    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            EngineError::InvalidConfig(_)
                | EngineError::ConfigLoadFailed(_)
                | EngineError::ConfigSaveFailed(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use netcafe_core::Money;

    #[test]
    fn test_core_errors_pass_through() {
        let err: EngineError = CoreError::InvalidAmount(Money::zero()).into();
        assert_eq!(err.to_string(), "Invalid amount: 0");
        assert!(matches!(err.core_error(), Some(CoreError::InvalidAmount(_))));
        assert!(err.store_error().is_none());
    }

    #[test]
    fn test_validation_becomes_core() {
        let err: EngineError = ValidationError::Required {
            field: "username".into(),
        }
        .into();
        assert!(matches!(err.core_error(), Some(CoreError::Validation(_))));
    }

    #[test]
    fn test_store_errors_are_kept() {
        let err: EngineError = StoreError::Unavailable("disk".into()).into();
        assert_eq!(err.store_error(), Some(&StoreError::Unavailable("disk".into())));
        assert!(!err.is_config_error());
        assert!(EngineError::InvalidConfig("x".into()).is_config_error());
    }
}
