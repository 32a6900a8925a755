//! # CLI Error Type
//!
//! Unified error type for `till` subcommands.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  subcommand                                                             │
//! │     │                                                                   │
//! │     ├── ConfigError ─────────────────┐                                  │
//! │     ├── DbError (opening the store) ─┤                                  │
//! │     ├── CoreError (every service) ───┼──► CliError { code, message }   │
//! │     └── bad argument ────────────────┘          │                       │
//! │                                                 ▼                       │
//! │                           stderr: {"code":"INSUFFICIENT_STOCK", ...}   │
//! │                           exit status: CliError::exit_code()           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use till_core::CoreError;
use till_db::DbError;

use crate::config::ConfigError;

/// Error reported by a failed subcommand.
///
/// ## Serialization
/// ```json
/// {
///   "code": "INSUFFICIENT_STOCK",
///   "message": "Insufficient stock for 3f2a...: 5 available, 10 requested"
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CliError {
    /// Machine-readable error code for scripts
    pub code: ErrorCode,

    /// Human-readable error message
    pub message: String,
}

/// Error codes for CLI failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found
    NotFound,

    /// Input validation failed
    ValidationError,

    /// Cart operation failed
    CartError,

    /// Insufficient stock
    InsufficientStock,

    /// Payment amount rejected
    PaymentError,

    /// The store refused or failed the commit
    CommitFailed,

    /// A read from the store failed
    DatabaseError,

    /// Sales are paused
    Maintenance,

    /// Bad configuration
    ConfigError,
}

impl CliError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        CliError {
            code,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        CliError::new(ErrorCode::ValidationError, message)
    }

    /// Process exit status for this error.
    ///
    /// 2 for caller mistakes, 1 for everything else.
    pub fn exit_code(&self) -> i32 {
        match self.code {
            ErrorCode::ValidationError
            | ErrorCode::CartError
            | ErrorCode::PaymentError
            | ErrorCode::ConfigError => 2,
            _ => 1,
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        let code = match &err {
            CoreError::NotFound { .. } => ErrorCode::NotFound,
            CoreError::InsufficientStock { .. } => ErrorCode::InsufficientStock,
            CoreError::InvalidPaymentAmount { .. } => ErrorCode::PaymentError,
            CoreError::EmptyCart
            | CoreError::CartLineNotFound { .. }
            | CoreError::CartTooLarge { .. } => ErrorCode::CartError,
            CoreError::InvalidQuantity { .. }
            | CoreError::QuantityTooLarge { .. }
            | CoreError::MissingSalesperson
            | CoreError::Validation(_) => ErrorCode::ValidationError,
            CoreError::CommitFailed(reason) => {
                tracing::error!(%reason, "Commit failed");
                ErrorCode::CommitFailed
            }
            CoreError::QueryFailed(reason) => {
                tracing::error!(%reason, "Query failed");
                ErrorCode::DatabaseError
            }
        };
        CliError::new(code, err.to_string())
    }
}

/// Only reached when opening the store or flipping the maintenance flag;
/// services report through `CoreError`.
impl From<DbError> for CliError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => {
                CliError::new(ErrorCode::NotFound, format!("{entity} not found: {id}"))
            }
            other => {
                tracing::error!(error = %other, "Database error");
                CliError::new(ErrorCode::DatabaseError, other.to_string())
            }
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        CliError::new(ErrorCode::ConfigError, err.to_string())
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for CliError {}

pub type CliResult<T> = Result<T, CliError>;
