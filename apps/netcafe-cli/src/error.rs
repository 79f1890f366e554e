//! # CLI Error Type
//!
//! One error shape for every command, with a stable code and an exit
//! status.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  command ──► CafeEngine ──► EngineError                                │
//! │                               ├── Core(CoreError)   ──┐                 │
//! │                               ├── Store(StoreError) ──┼──► CliError    │
//! │                               └── config variants   ──┘    │            │
//! │                                                            ▼            │
//! │                               stderr "[CODE] message", exit(code)      │
//! │                               or JSON with --json                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;

use netcafe_core::CoreError;
use netcafe_engine::EngineError;
use netcafe_store::StoreError;

/// Error reported by a CLI command.
///
/// ## Serialization
/// With `--json` this is what gets printed:
/// ```json
/// {
///   "code": "INSUFFICIENT_BALANCE",
///   "message": "Insufficient balance: available 10000, required 15000"
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CliError {
    pub code: ErrorCode,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    NotFound,
    ValidationError,
    AuthFailed,
    /// Computer busy or account already online
    Conflict,
    InsufficientBalance,
    /// Wrong lifecycle state (closed session, served order, locked item)
    BusinessLogic,
    StoreError,
    ConfigError,
    Internal,
}

impl ErrorCode {
    /// Process exit status for this code.
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorCode::ValidationError | ErrorCode::ConfigError => 2,
            ErrorCode::StoreError | ErrorCode::Internal => 3,
            _ => 1,
        }
    }
}

impl CliError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        CliError {
            code,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        CliError::new(ErrorCode::Internal, message)
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        let code = match &err {
            CoreError::Auth { .. } => ErrorCode::AuthFailed,
            CoreError::Occupancy { .. } | CoreError::AlreadyOnline(_) => ErrorCode::Conflict,
            CoreError::InsufficientBalance { .. } => ErrorCode::InsufficientBalance,
            CoreError::InvalidState { .. }
            | CoreError::InactiveSession(_)
            | CoreError::LockedItem(_)
            | CoreError::AccountDetached(_) => ErrorCode::BusinessLogic,
            CoreError::InvalidQuantity { .. }
            | CoreError::AmountOverflow(_)
            | CoreError::InvalidAmount(_)
            | CoreError::Validation(_) => ErrorCode::ValidationError,
            CoreError::AccountNotFound(_)
            | CoreError::ComputerNotFound(_)
            | CoreError::ServiceItemNotFound(_)
            | CoreError::OrderNotFound(_) => ErrorCode::NotFound,
        };
        CliError::new(code, err.to_string())
    }
}

impl From<StoreError> for CliError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { entity, id } => {
                CliError::new(ErrorCode::NotFound, format!("{} not found: {}", entity, id))
            }
            StoreError::UniqueViolation { field, value } => CliError::new(
                ErrorCode::ValidationError,
                format!("{} '{}' already exists", field, value),
            ),
            other => {
                tracing::error!("Store operation failed: {}", other);
                CliError::new(ErrorCode::StoreError, other.to_string())
            }
        }
    }
}

impl From<EngineError> for CliError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Core(e) => e.into(),
            EngineError::Store(e) => e.into(),
            other => CliError::new(ErrorCode::ConfigError, other.to_string()),
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        CliError::internal(format!("JSON encoding failed: {}", err))
    }
}

impl From<toml::ser::Error> for CliError {
    fn from(err: toml::ser::Error) -> Self {
        CliError::internal(format!("TOML encoding failed: {}", err))
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for CliError {}
