//! # Repository Module
//!
//! Database repository implementations for Till POS.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Service (Catalog / SalesLedger / TransactionCommitter)                 │
//! │       │                                                                 │
//! │       │  db.goods().search("milk")                                     │
//! │       ▼                                                                 │
//! │  GoodRepository / SaleRepository / SettingsRepository                  │
//! │       │                                                                 │
//! │       │  SQL (runtime-checked sqlx queries)                            │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Repositories speak `DbError`. The services above them translate into
//! `CoreError`.
//!
//! ## Available Repositories
//!
//! - [`good::GoodRepository`] - Catalog reads, provisioning, CAS stock update
//! - [`sale::SaleRepository`] - Ledger append and streaming reads
//! - [`settings::SettingsRepository`] - Maintenance flag

pub mod good;
pub mod sale;
pub mod settings;
