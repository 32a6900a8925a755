//! # Domain Types
//!
//! Core domain types used throughout Till POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      Good       │   │      Sale       │   │    SaleLine     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  good_id        │       │
//! │  │  product_id     │   │  receipt_number │   │  name (frozen)  │       │
//! │  │  price_cents    │   │  salesperson_id │   │  unit price     │       │
//! │  │  cost_cents     │   │  lines[]        │   │  cost price     │       │
//! │  │  stock          │   │  total / paid   │   │  quantity       │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    GoodType     │   │   SaleFilter    │   │    Receipt      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  Retail         │   │  salesperson?   │   │  store info     │       │
//! │  │  Wholesale      │   │  date range?    │   │  sale snapshot  │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every entity has:
//! - `id`: UUID v4 - immutable, used for database relations
//! - Business ID: (product_id, receipt_number) - human-readable, scannable

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Good Type
// =============================================================================

/// How a good is sold.
///
/// Wholesale goods carry a secondary `quantity` counter (units per pack);
/// retail goods keep it at zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum GoodType {
    Retail,
    Wholesale,
}

impl Default for GoodType {
    fn default() -> Self {
        GoodType::Retail
    }
}

impl GoodType {
    pub fn as_str(&self) -> &'static str {
        match self {
            GoodType::Retail => "retail",
            GoodType::Wholesale => "wholesale",
        }
    }
}

impl std::str::FromStr for GoodType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "retail" => Ok(GoodType::Retail),
            "wholesale" => Ok(GoodType::Wholesale),
            other => Err(format!("unknown good type '{other}'")),
        }
    }
}

// =============================================================================
// Good
// =============================================================================

/// A good available for sale.
///
/// Stock is only ever written by the transaction committer; every other
/// component treats it as read-only reference data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Good {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Scan code printed on the shelf label or QR sticker.
    pub product_id: String,

    /// Display name shown to the salesperson and on the receipt.
    pub name: String,

    /// Selling price in cents.
    pub price_cents: i64,

    /// Cost price in cents (for profit calculations).
    pub cost_cents: i64,

    /// Units on hand. Never negative.
    pub stock: i64,

    /// Secondary counter for wholesale goods; zero for retail.
    pub quantity: i64,

    pub good_type: GoodType,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for provisioning a new good.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewGood {
    pub product_id: String,
    pub name: String,
    pub price_cents: i64,
    pub cost_cents: i64,
    pub stock: i64,
    #[serde(default)]
    pub quantity: i64,
    #[serde(default)]
    pub good_type: GoodType,
}

// =============================================================================
// Sale Line
// =============================================================================

/// A line item in a sale.
/// Uses snapshot pattern to freeze good data at time of sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleLine {
    pub good_id: String,
    /// Product id at time of sale (frozen).
    pub product_id: String,
    /// Name at time of sale (frozen). Metrics aggregate by this.
    pub name: String,
    /// Unit price in cents at time of sale (frozen).
    pub unit_price_cents: i64,
    /// Cost price in cents at time of sale (frozen).
    pub cost_price_cents: i64,
    pub quantity: i64,
}

impl SaleLine {
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// unit price × quantity
    #[inline]
    pub fn line_total(&self) -> Money {
        self.unit_price().multiply_quantity(self.quantity)
    }

    /// (unit price − cost price) × quantity
    #[inline]
    pub fn line_profit(&self) -> Money {
        Money::from_cents(self.unit_price_cents - self.cost_price_cents)
            .multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Sale
// =============================================================================

/// A committed sale. Immutable once created; never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sale {
    pub id: String,
    /// Human-readable number printed on the receipt: `YYYYMMDD-NNNN`.
    pub receipt_number: String,
    pub salesperson_id: String,
    pub lines: Vec<SaleLine>,
    pub total_cents: i64,
    pub amount_paid_cents: i64,
    pub change_cents: i64,
    /// Assigned by the ledger at commit time.
    pub created_at: DateTime<Utc>,
}

impl Sale {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    #[inline]
    pub fn change(&self) -> Money {
        Money::from_cents(self.change_cents)
    }

    /// Sum of line profits.
    pub fn profit(&self) -> Money {
        self.lines.iter().map(SaleLine::line_profit).sum()
    }

    pub fn item_count(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }
}

// =============================================================================
// Ledger Filters
// =============================================================================

/// Half-open time range: `start <= t < end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        DateRange { start, end }
    }
}

/// Which sales a ledger query returns. Both parts optional; the default
/// matches every sale.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleFilter {
    pub salesperson_id: Option<String>,
    pub range: Option<DateRange>,
}

impl SaleFilter {
    pub fn all() -> Self {
        SaleFilter::default()
    }

    pub fn for_salesperson(salesperson_id: impl Into<String>) -> Self {
        SaleFilter {
            salesperson_id: Some(salesperson_id.into()),
            range: None,
        }
    }

    pub fn with_range(mut self, range: DateRange) -> Self {
        self.range = Some(range);
        self
    }
}

// =============================================================================
// Receipt
// =============================================================================

/// Store details printed on every receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreInfo {
    pub name: String,
    pub address_lines: Vec<String>,
    pub footer_lines: Vec<String>,
}

impl Default for StoreInfo {
    fn default() -> Self {
        StoreInfo {
            name: "Till POS".to_string(),
            address_lines: Vec::new(),
            footer_lines: vec![
                "Thank you for your purchase!".to_string(),
                "Goods taken in good condition can't be returned.".to_string(),
            ],
        }
    }
}

/// Read-only payload handed to a printer. Rendering is the printer's job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub store_name: String,
    pub store_address: Vec<String>,
    pub receipt_number: String,
    pub salesperson_id: String,
    pub issued_at: DateTime<Utc>,
    pub lines: Vec<SaleLine>,
    pub total_cents: i64,
    pub amount_paid_cents: i64,
    pub change_cents: i64,
    pub footer: Vec<String>,
}

impl Receipt {
    pub fn from_sale(sale: &Sale, store: &StoreInfo) -> Self {
        Receipt {
            store_name: store.name.clone(),
            store_address: store.address_lines.clone(),
            receipt_number: sale.receipt_number.clone(),
            salesperson_id: sale.salesperson_id.clone(),
            issued_at: sale.created_at,
            lines: sale.lines.clone(),
            total_cents: sale.total_cents,
            amount_paid_cents: sale.amount_paid_cents,
            change_cents: sale.change_cents,
            footer: store.footer_lines.clone(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
