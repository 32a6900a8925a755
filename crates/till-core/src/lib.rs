//! # till-core: Pure Business Logic for Till POS
//!
//! This crate holds every rule of the sale workflow as pure functions with
//! zero I/O dependencies. Persistence lives in `till-db`.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Till POS Data Flow                              │
//! │                                                                         │
//! │  Catalog ──► Cart ──► Commit Plan ──► Atomic Batch ──► Sales Ledger    │
//! │  (Good)     (lines)   (THIS CRATE)    (till-db)        (till-db)        │
//! │                                                            │            │
//! │                                                            ▼            │
//! │                                                  Metrics Aggregator     │
//! │                                                  (THIS CRATE)           │
//! │                                                                         │
//! │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Good, Sale, SaleLine, Receipt, filters)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`cart`] - The in-progress cart and its line items
//! - [`commit`] - Stock checks and the atomic batch a sale commits as
//! - [`metrics`] - Date grouping and sales performance metrics
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Example Usage
//!
//! ```rust
//! use till_core::money::Money;
//!
//! let price = Money::from_cents(1099); // $10.99
//! let line_total = price.multiply_quantity(3);
//! assert_eq!(line_total.cents(), 3297);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod commit;
pub mod error;
pub mod metrics;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, CartLine};
pub use commit::{
    plan_commit, validate_commit_input, BatchOp, CommitPlan, SaleDraft, StockAdjustment,
};
pub use error::{CoreError, CoreResult, ValidationError};
pub use metrics::{DailySales, ItemSales, MetricsSnapshot, ReportingZone};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum distinct lines allowed in a single cart.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity of a single line in a cart.
///
/// Guards against typing 1000 instead of 10 at the till.
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Highest unit price or cost a good can carry, in cents (100,000,000.00).
///
/// `MAX_PRICE_CENTS × MAX_ITEM_QUANTITY × MAX_CART_ITEMS` stays well inside
/// `i64`, so cart totals and sale totals cannot overflow.
pub const MAX_PRICE_CENTS: i64 = 10_000_000_000;

/// Number of entries reported in `MetricsSnapshot::top_selling_items`.
pub const TOP_SELLING_LIMIT: usize = 3;

/// Stock level below which a good shows up in the low-stock report.
pub const DEFAULT_LOW_STOCK_THRESHOLD: i64 = 10;
