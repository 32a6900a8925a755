//! # Till POS Command Line
//!
//! Commands:
//! - `till goods` - List or search the catalog
//! - `till scan` - Look a good up by product id
//! - `till low-stock` - Goods running out
//! - `till sell` - Commit a sale and print its receipt
//! - `till sales` - Daily sales history
//! - `till metrics` - Sales performance snapshot
//! - `till maintenance` - Pause or resume sales
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. Parse arguments (clap)                                              │
//! │  2. Initialize tracing    RUST_LOG, default info,till=debug,sqlx=warn  │
//! │  3. Load AppConfig        TILL_* environment variables over defaults    │
//! │  4. Open database         create data dir, WAL, run migrations          │
//! │  5. Run subcommand        JSON on stdout, CliError JSON on stderr       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod commands;
mod config;
mod error;

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use commands::{Context, GoodsArgs, LowStockArgs, MaintenanceArgs, ReportArgs, ScanArgs, SellArgs};
use config::{AppConfig, ConfigError};
use error::CliResult;
use till_db::Database;

/// Till POS - point-of-sale till backed by a local SQLite store
#[derive(Parser)]
#[command(name = "till")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Database file (overrides TILL_DB_PATH)
    #[arg(long, global = true)]
    db: Option<std::path::PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List or search the catalog
    Goods(GoodsArgs),

    /// Look a good up by its scanned product id
    Scan(ScanArgs),

    /// Goods whose stock is below the threshold
    LowStock(LowStockArgs),

    /// Commit a sale and print its receipt
    Sell(SellArgs),

    /// Daily sales history
    Sales(ReportArgs),

    /// Sales performance metrics
    Metrics(ReportArgs),

    /// Pause or resume sales
    Maintenance(MaintenanceArgs),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing();

    if let Err(err) = run(cli).await {
        let payload = serde_json::to_string(&err).unwrap_or_else(|_| err.to_string());
        eprintln!("{payload}");
        std::process::exit(err.exit_code());
    }
}

async fn run(cli: Cli) -> CliResult<()> {
    let mut config = AppConfig::from_env()?;
    if let Some(path) = cli.db {
        config.db_path = path;
    }

    if let Some(dir) = config.db_path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(|e| ConfigError::DataDir {
            path: dir.display().to_string(),
            reason: e.to_string(),
        })?;
    }

    info!(db_path = %config.db_path.display(), "Starting till");
    let db = Database::new(config.db_config()).await?;
    let ctx = Context { db, config };

    let result = match cli.command {
        Commands::Goods(args) => commands::catalog::goods(args, &ctx).await,
        Commands::Scan(args) => commands::catalog::scan(args, &ctx).await,
        Commands::LowStock(args) => commands::catalog::low_stock(args, &ctx).await,
        Commands::Sell(args) => commands::sale::sell(args, &ctx).await,
        Commands::Sales(args) => commands::report::sales(args, &ctx).await,
        Commands::Metrics(args) => commands::report::metrics(args, &ctx).await,
        Commands::Maintenance(args) => commands::settings::maintenance(args, &ctx).await,
    };

    ctx.db.close().await;
    result
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=till=trace` - Show trace for till crates only
/// - Default: `info,till=debug,sqlx=warn`
///
/// Logs go to stderr so stdout stays machine-readable.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,till=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
