//! Subcommand implementations.

pub mod catalog;
pub mod report;
pub mod sale;
pub mod settings;

use clap::{Args, Subcommand};
use serde::Serialize;
use till_db::Database;

use crate::config::AppConfig;
use crate::error::{CliError, CliResult, ErrorCode};

/// Everything a subcommand needs.
pub struct Context {
    pub db: Database,
    pub config: AppConfig,
}

/// Arguments for the goods command.
#[derive(Args)]
pub struct GoodsArgs {
    /// Case-insensitive substring of the name or product id.
    #[arg(short, long)]
    pub search: Option<String>,
}

/// Arguments for the scan command.
#[derive(Args)]
pub struct ScanArgs {
    /// Scanned product id.
    pub product_id: String,
}

/// Arguments for the low-stock command.
#[derive(Args)]
pub struct LowStockArgs {
    /// Report goods below this stock (default: TILL_LOW_STOCK_THRESHOLD).
    #[arg(short, long)]
    pub threshold: Option<i64>,
}

/// Arguments for the sell command.
#[derive(Args)]
pub struct SellArgs {
    /// Salesperson recorded on the sale.
    #[arg(short, long)]
    pub salesperson: String,

    /// Line items as PRODUCT_ID:QTY (repeatable, QTY defaults to 1).
    #[arg(short, long = "item", value_name = "PRODUCT_ID[:QTY]", required = true)]
    pub items: Vec<String>,

    /// Amount tendered, e.g. 50 or 49.95.
    #[arg(short, long)]
    pub paid: String,
}

/// Arguments shared by the sales and metrics commands.
#[derive(Args)]
pub struct ReportArgs {
    /// Only this salesperson's sales.
    #[arg(short, long)]
    pub salesperson: Option<String>,

    /// Only this calendar date (YYYY-MM-DD) in the configured offset.
    #[arg(short, long)]
    pub date: Option<String>,
}

/// Arguments for the maintenance command.
#[derive(Args)]
pub struct MaintenanceArgs {
    #[command(subcommand)]
    pub action: MaintenanceAction,
}

#[derive(Subcommand, Clone, Copy)]
pub enum MaintenanceAction {
    /// Pause sales
    On,
    /// Resume sales
    Off,
    /// Show the current flag
    Status,
}

/// Writes `value` to stdout as pretty JSON.
pub fn print_json<T: Serialize>(value: &T) -> CliResult<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| CliError::new(ErrorCode::DatabaseError, e.to_string()))?;
    println!("{json}");
    Ok(())
}
