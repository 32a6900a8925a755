//! # till-db: Database Layer for Till POS
//!
//! SQLite persistence for the catalog and the sales ledger, and the
//! transaction committer that joins them.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Till POS Data Flow                               │
//! │                                                                         │
//! │  till-cli (sell / goods / metrics ...)                                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     till-db (THIS CRATE)                        │   │
//! │  │                                                                 │   │
//! │  │   Catalog      TransactionCommitter     SalesLedger  Reports   │   │
//! │  │      │                 │                     │          │       │   │
//! │  │      │           StockStore (trait)          │          │       │   │
//! │  │      ▼                 ▼                     ▼          │       │   │
//! │  │   ┌───────────────┐  ┌──────────────┐  ┌──────────────┐ │       │   │
//! │  │   │ GoodRepo      │  │ atomic_batch │  │ SaleRepo     │◄┘       │   │
//! │  │   │ SettingsRepo  │  │ (one tx)     │  │ (stream)     │         │   │
//! │  │   └───────────────┘  └──────────────┘  └──────────────┘         │   │
//! │  │            Database (pool.rs) + embedded migrations             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite (WAL)   ~/.local/share/till/till.db                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types and mapping into `CoreError`
//! - [`repository`] - Raw table access (goods, sales, settings)
//! - [`store`] - The `StockStore` seam and its atomic batch
//! - [`catalog`] - Catalog service
//! - [`committer`] - Cart → Sale commit with stock decrement
//! - [`ledger`] - Sales ledger reads
//! - [`reports`] - Metrics and daily history
//!
//! ## Usage
//!
//! ```rust,ignore
//! use till_db::{Catalog, CommitterConfig, Database, DbConfig, TransactionCommitter};
//!
//! let db = Database::new(DbConfig::new("till.db")).await?;
//!
//! let rice = Catalog::new(&db).find_by_product_id("RICE-5KG").await?;
//! let mut cart = Cart::new();
//! cart.add(&rice, 2)?;
//!
//! let committer = TransactionCommitter::new(db.clone(), CommitterConfig::default());
//! let done = committer.commit(&mut cart, "amy", 5000).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod catalog;
pub mod committer;
pub mod error;
pub mod ledger;
pub mod migrations;
pub mod pool;
pub mod reports;
pub mod repository;
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

pub use catalog::Catalog;
pub use committer::{CommitReceipt, CommitterConfig, TransactionCommitter};
pub use error::{DbError, DbResult};
pub use ledger::SalesLedger;
pub use pool::{Database, DbConfig, DEFAULT_BUSY_TIMEOUT};
pub use reports::ReportService;
pub use store::StockStore;

// Repository re-exports for convenience
pub use repository::good::GoodRepository;
pub use repository::sale::SaleRepository;
pub use repository::settings::SettingsRepository;
