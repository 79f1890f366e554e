//! # Validation Module
//!
//! Input validation for registration, catalog management and top-ups.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Front end                                                    │
//! │  └── Basic format checks, immediate feedback                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  └── Field rules (names, prices, rates) → ValidationError             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Engine                                                       │
//! │  └── State rules (locked item, closed session, balance) → CoreError   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use netcafe_core::money::Money;
//! use netcafe_core::validation::{validate_price, validate_username};
//!
//! assert!(validate_username("user1").is_ok());
//! assert!(validate_price(Money::from_minor(15_000)).is_ok());
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::{MAX_NAME_LEN, MAX_NOTE_LEN};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

fn required_with_max(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(())
}

/// Validates a login name.
///
/// ## Rules
/// - Must not be empty
/// - At most `MAX_NAME_LEN` characters
/// - No whitespace (usernames are typed at the terminal login screen)
///
/// ## Example
/// ```rust
/// use netcafe_core::validation::validate_username;
///
/// assert!(validate_username("user1").is_ok());
/// assert!(validate_username("").is_err());
/// assert!(validate_username("user 1").is_err());
/// ```
pub fn validate_username(username: &str) -> ValidationResult<()> {
    required_with_max("username", username, MAX_NAME_LEN)?;

    if username.chars().any(char::is_whitespace) {
        return Err(ValidationError::InvalidFormat {
            field: "username".to_string(),
            reason: "must not contain whitespace".to_string(),
        });
    }

    Ok(())
}

/// Validates a password. Only presence is checked.
pub fn validate_password(password: &str) -> ValidationResult<()> {
    if password.is_empty() {
        return Err(ValidationError::Required {
            field: "password".to_string(),
        });
    }
    Ok(())
}

/// Validates an account display name.
pub fn validate_display_name(name: &str) -> ValidationResult<()> {
    required_with_max("display_name", name, MAX_NAME_LEN)
}

/// Validates a catalog item name.
///
/// ## Example
/// ```rust
/// use netcafe_core::validation::validate_item_name;
///
/// assert!(validate_item_name("Mi ly").is_ok());
/// assert!(validate_item_name("   ").is_err());
/// ```
pub fn validate_item_name(name: &str) -> ValidationResult<()> {
    required_with_max("name", name, MAX_NAME_LEN)
}

/// Validates a computer name.
pub fn validate_computer_name(name: &str) -> ValidationResult<()> {
    required_with_max("computer name", name, MAX_NAME_LEN)
}

/// Validates the free-text note of a top-up. Empty notes are allowed.
pub fn validate_note(note: &str) -> ValidationResult<()> {
    if note.chars().count() > MAX_NOTE_LEN {
        return Err(ValidationError::TooLong {
            field: "note".to_string(),
            max: MAX_NOTE_LEN,
        });
    }
    Ok(())
}

// =============================================================================
// Money Validators
// =============================================================================

/// Validates a catalog unit price.
///
/// ## Rules
/// - Must be non-negative
/// - Zero is allowed (free items, e.g. water)
pub fn validate_price(price: Money) -> ValidationResult<()> {
    if price.is_negative() {
        return Err(ValidationError::MustNotBeNegative {
            field: "price".to_string(),
        });
    }
    Ok(())
}

/// Validates an hourly computer rate. Zero is allowed (staff machines).
pub fn validate_rate(rate: Money) -> ValidationResult<()> {
    if rate.is_negative() {
        return Err(ValidationError::MustNotBeNegative {
            field: "rate_per_hour".to_string(),
        });
    }
    Ok(())
}

/// Validates an opening balance at registration.
pub fn validate_opening_balance(balance: Money) -> ValidationResult<()> {
    if balance.is_negative() {
        return Err(ValidationError::MustNotBeNegative {
            field: "balance".to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
