//! # Error Types
//!
//! Domain-specific error types for till-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  till-core errors (this file)                                          │
//! │  ├── CoreError        - The sale workflow taxonomy                     │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  till-db errors (separate crate)                                       │
//! │  └── DbError          - Database operation failures                    │
//! │                         (mapped into CommitFailed / QueryFailed)       │
//! │                                                                         │
//! │  CLI errors (in app)                                                   │
//! │  └── CliError         - What the operator sees (with an error code)    │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → CliError → terminal               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Propagation Policy
//! - `InvalidQuantity`, `EmptyCart`, `MissingSalesperson` are raised before the
//!   store is touched. The caller fixes the input; nothing to retry.
//! - `InsufficientStock` and `CommitFailed` are surfaced verbatim. Failed
//!   batches are never retried automatically.
//! - `NotFound` and `QueryFailed` come from the read path.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A cart quantity below the allowed minimum.
    ///
    /// ## When This Occurs
    /// - `Cart::add` with a quantity < 1
    /// - `Cart::set_quantity` with a negative quantity
    #[error("Invalid quantity: {quantity}")]
    InvalidQuantity { quantity: i64 },

    /// Commit attempted with no lines in the cart.
    #[error("Cart is empty")]
    EmptyCart,

    /// Commit attempted without a salesperson identifier.
    #[error("Salesperson identifier is required")]
    MissingSalesperson,

    /// Not enough stock to complete the sale.
    ///
    /// ## User Workflow
    /// ```text
    /// Cart: 10 × RICE-5KG
    ///      │
    ///      ▼
    /// Re-read stock: available=5
    ///      │
    ///      ▼
    /// InsufficientStock { good_id, available: 5, requested: 10 }
    ///      │
    ///      ▼
    /// Nothing recorded, nothing decremented
    /// ```
    #[error("Insufficient stock for {good_id}: available {available}, requested {requested}")]
    InsufficientStock {
        good_id: String,
        available: i64,
        requested: i64,
    },

    /// The atomic batch could not be applied (store rejection, timeout,
    /// exhausted conflict retries). No effect is visible.
    #[error("Commit failed: {0}")]
    CommitFailed(String),

    /// Unknown good or sale.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Ledger or catalog read failure.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Cart line index out of range.
    #[error("Cart has no line at index {index}")]
    CartLineNotFound { index: usize },

    /// Cart has exceeded maximum allowed lines.
    #[error("Cart cannot have more than {max} items")]
    CartTooLarge { max: usize },

    /// Line quantity exceeds maximum allowed.
    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    /// Payment amount is invalid.
    #[error("Invalid payment amount: {reason}")]
    InvalidPaymentAmount { reason: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        CoreError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// True for errors raised before any store interaction.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            CoreError::InvalidQuantity { .. }
                | CoreError::EmptyCart
                | CoreError::MissingSalesperson
                | CoreError::CartLineNotFound { .. }
                | CoreError::CartTooLarge { .. }
                | CoreError::QuantityTooLarge { .. }
                | CoreError::InvalidPaymentAmount { .. }
                | CoreError::Validation(_)
        )
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., product id with spaces).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Duplicate value (e.g., duplicate product id).
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
        let err = CoreError::InsufficientStock {
            good_id: "good-1".to_string(),
            available: 3,
            requested: 5,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for good-1: available 3, requested 5"
        );
        assert_eq!(CoreError::EmptyCart.to_string(), "Cart is empty");
        assert_eq!(
            CoreError::not_found("Good", "abc").to_string(),
            "Good not found: abc"
        );
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "name".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
        assert!(core_err.is_input_error());
    }

    #[test]
    fn test_store_errors_are_not_input_errors() {
        assert!(!CoreError::CommitFailed("disk full".into()).is_input_error());
        assert!(!CoreError::QueryFailed("locked".into()).is_input_error());
        assert!(CoreError::MissingSalesperson.is_input_error());
    }
}
