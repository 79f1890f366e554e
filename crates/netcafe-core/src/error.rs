//! # Error Types
//!
//! Domain-specific error types for netcafe-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  netcafe-core errors (this file)                                       │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  netcafe-store errors (separate crate)                                 │
//! │  └── StoreError       - Persistence failures                           │
//! │                                                                         │
//! │  netcafe-engine errors                                                 │
//! │  └── EngineError      - CoreError | StoreError (passed through as-is)  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every variant is recoverable; none of them is fatal to the process.

use thiserror::Error;

use crate::money::Money;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// Bad credentials or an inactive account.
    ///
    /// The message never says which of the two checks failed.
    #[error("Authentication failed for {username}")]
    Auth { username: String },

    /// The computer already hosts an ACTIVE session.
    #[error("Computer {computer} is already in use")]
    Occupancy { computer: String },

    /// The username already has an ACTIVE session elsewhere.
    #[error("Account {0} is already logged in")]
    AlreadyOnline(String),

    /// Operation on an entity in the wrong lifecycle state
    /// (second logout, serving an already served order).
    #[error("{entity} {id} is in the wrong state: {reason}")]
    InvalidState {
        entity: String,
        id: String,
        reason: String,
    },

    /// Order placed against a CLOSED session.
    #[error("Session {0} is closed")]
    InactiveSession(String),

    /// The catalog item is locked and cannot be newly ordered.
    #[error("Service item {0} is locked")]
    LockedItem(String),

    /// Quantity is zero, negative, or makes the cost overflow.
    #[error("Invalid quantity: {quantity}")]
    InvalidQuantity { quantity: i64 },

    /// A session's service or invoice totals would leave the `Money` range.
    #[error("Amount overflow in session {0}")]
    AmountOverflow(String),

    /// An ACCOUNT-paid order costs more than the balance.
    #[error("Insufficient balance: available {available}, required {required}")]
    InsufficientBalance { available: Money, required: Money },

    /// Top-up amount is zero or negative.
    #[error("Invalid amount: {0}")]
    InvalidAmount(Money),

    /// The shared account cell was detached by logout or replacement and
    /// must not be mutated any more.
    #[error("Account {0} is no longer online")]
    AccountDetached(String),

    #[error("Account not found: {0}")]
    AccountNotFound(String),

    #[error("Computer not found: {0}")]
    ComputerNotFound(String),

    #[error("Service item not found: {0}")]
    ServiceItemNotFound(String),

    #[error("Order not found: {0}")]
    OrderNotFound(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Invalid format (e.g., whitespace in a username).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Duplicate value (e.g., a username that is taken).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientBalance {
            available: Money::from_minor(150_000),
            required: Money::from_minor(240_000),
        };
        assert_eq!(
            err.to_string(),
            "Insufficient balance: available 150000, required 240000"
        );

        let err = CoreError::Occupancy {
            computer: "PC-1".to_string(),
        };
        assert_eq!(err.to_string(), "Computer PC-1 is already in use");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "username".to_string(),
        };
        assert_eq!(err.to_string(), "username is required");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::MustBePositive {
            field: "price".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
