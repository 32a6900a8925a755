//! # Validation Module
//!
//! Input validation utilities for Till POS.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: CLI arguments (clap)                                         │
//! │  └── Types and required flags                                          │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Catalog fields (product id, name, prices, stock)                  │
//! │  └── Salesperson identifier, search queries                            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── UNIQUE(product_id)                                                │
//! │  └── CHECK(stock >= 0)                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Cart quantities are checked by [`crate::cart::Cart`] itself, which reports
//! them as `CoreError::InvalidQuantity` / `QuantityTooLarge`.
//!
//! ## Usage
//! ```rust
//! use till_core::validation::{validate_product_id, validate_salesperson};
//!
//! validate_product_id("RICE-5KG").unwrap();
//! assert_eq!(validate_salesperson("  amy ").unwrap(), "amy");
//! ```

use crate::error::ValidationError;
use crate::types::NewGood;
use crate::MAX_PRICE_CENTS;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

pub const MAX_PRODUCT_ID_LEN: usize = 50;
pub const MAX_NAME_LEN: usize = 200;
pub const MAX_SEARCH_LEN: usize = 100;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a product identifier (the scan code).
///
/// ## Rules
/// - Must not be empty
/// - At most 50 characters
/// - Letters, numbers, hyphens, underscores only (QR payloads are plain codes)
///
/// ## Example
/// ```rust
/// use till_core::validation::validate_product_id;
///
/// assert!(validate_product_id("RICE-5KG").is_ok());
/// assert!(validate_product_id("").is_err());
/// assert!(validate_product_id("has space").is_err());
/// ```
pub fn validate_product_id(code: &str) -> ValidationResult<()> {
    let code = code.trim();

    if code.is_empty() {
        return Err(ValidationError::Required {
            field: "product_id".to_string(),
        });
    }

    if code.len() > MAX_PRODUCT_ID_LEN {
        return Err(ValidationError::TooLong {
            field: "product_id".to_string(),
            max: MAX_PRODUCT_ID_LEN,
        });
    }

    if !code
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "product_id".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

/// Validates a good's display name: non-empty, at most 200 characters.
pub fn validate_good_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: MAX_NAME_LEN,
        });
    }

    Ok(())
}

/// Validates a search query.
///
/// ## Rules
/// - Can be empty (lists everything)
/// - Maximum 100 characters
///
/// ## Returns
/// The trimmed query string.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.chars().count() > MAX_SEARCH_LEN {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: MAX_SEARCH_LEN,
        });
    }

    Ok(query.to_string())
}

/// Validates the salesperson identifier attached to a sale.
///
/// The identifier comes from the session layer and is trusted as given;
/// only blankness is rejected. Returns the trimmed identifier.
pub fn validate_salesperson(salesperson_id: &str) -> ValidationResult<String> {
    let trimmed = salesperson_id.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Required {
            field: "salesperson".to_string(),
        });
    }
    Ok(trimmed.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a price in cents.
///
/// ## Rules
/// - Must be non-negative (>= 0)
/// - Zero is allowed (free items)
/// - At most `MAX_PRICE_CENTS`
///
/// ## Example
/// ```rust
/// use till_core::validation::validate_price_cents;
///
/// assert!(validate_price_cents("price", 1099).is_ok());
/// assert!(validate_price_cents("price", 0).is_ok());
/// assert!(validate_price_cents("cost", -100).is_err());
/// assert!(validate_price_cents("price", i64::MAX / 2).is_err());
/// ```
pub fn validate_price_cents(field: &str, cents: i64) -> ValidationResult<()> {
    if !(0..=MAX_PRICE_CENTS).contains(&cents) {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: MAX_PRICE_CENTS,
        });
    }

    Ok(())
}

/// Validates a stock or quantity counter: must be >= 0.
pub fn validate_counter(field: &str, value: i64) -> ValidationResult<()> {
    if value < 0 {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: i64::MAX,
        });
    }
    Ok(())
}

/// Validates a low-stock threshold: must be positive.
pub fn validate_threshold(threshold: i64) -> ValidationResult<()> {
    if threshold <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "threshold".to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Composite Validators
// =============================================================================

/// Validates every field of a good about to be registered.
pub fn validate_new_good(good: &NewGood) -> ValidationResult<()> {
    validate_product_id(&good.product_id)?;
    validate_good_name(&good.name)?;
    validate_price_cents("price", good.price_cents)?;
    validate_price_cents("cost", good.cost_cents)?;
    validate_counter("stock", good.stock)?;
    validate_counter("quantity", good.quantity)?;
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GoodType;

    fn new_good() -> NewGood {
        NewGood {
            product_id: "RICE-5KG".into(),
            name: "Rice 5kg".into(),
            price_cents: 4500,
            cost_cents: 3800,
            stock: 20,
            quantity: 0,
            good_type: GoodType::Retail,
        }
    }

    #[test]
    fn test_validate_product_id() {
        assert!(validate_product_id("RICE-5KG").is_ok());
        assert!(validate_product_id("code_1").is_ok());

        assert!(validate_product_id("").is_err());
        assert!(validate_product_id("   ").is_err());
        assert!(validate_product_id("has space").is_err());
        assert!(validate_product_id(&"A".repeat(51)).is_err());
    }

    #[test]
    fn test_validate_good_name() {
        assert!(validate_good_name("Peak Milk 400g").is_ok());
        assert!(validate_good_name("").is_err());
        assert!(validate_good_name(&"A".repeat(201)).is_err());
    }

    #[test]
    fn test_validate_search_query_trims_and_limits() {
        assert_eq!(validate_search_query("  rice ").unwrap(), "rice");
        assert_eq!(validate_search_query("").unwrap(), "");
        assert!(validate_search_query(&"q".repeat(101)).is_err());
    }

    #[test]
    fn test_validate_salesperson() {
        assert_eq!(validate_salesperson("amy").unwrap(), "amy");
        assert!(matches!(
            validate_salesperson("  "),
            Err(ValidationError::Required { .. })
        ));
    }

    #[test]
    fn test_validate_new_good() {
        assert!(validate_new_good(&new_good()).is_ok());

        let mut bad = new_good();
        bad.stock = -1;
        assert!(validate_new_good(&bad).is_err());

        let mut bad = new_good();
        bad.cost_cents = -5;
        assert!(validate_new_good(&bad).is_err());
    }

    #[test]
    fn test_price_upper_bound() {
        assert!(validate_price_cents("price", MAX_PRICE_CENTS).is_ok());

        let mut bad = new_good();
        bad.price_cents = i64::MAX / 2;
        assert!(matches!(
            validate_new_good(&bad),
            Err(ValidationError::OutOfRange { max: MAX_PRICE_CENTS, .. })
        ));

        let mut bad = new_good();
        bad.cost_cents = MAX_PRICE_CENTS + 1;
        assert!(validate_new_good(&bad).is_err());
    }

    #[test]
    fn test_validate_threshold() {
        assert!(validate_threshold(10).is_ok());
        assert!(validate_threshold(0).is_err());
    }
}
