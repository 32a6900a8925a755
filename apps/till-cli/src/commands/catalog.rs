//! # Catalog Commands
//!
//! `goods`, `scan` and `low-stock`.

use tracing::debug;
use till_db::Catalog;

use super::{print_json, Context, GoodsArgs, LowStockArgs, ScanArgs};
use crate::error::CliResult;

/// Lists the catalog, or the goods matching `--search`.
pub async fn goods(args: GoodsArgs, ctx: &Context) -> CliResult<()> {
    let catalog = Catalog::new(&ctx.db);
    let goods = match args.search.as_deref() {
        Some(query) => catalog.search(query).await?,
        None => catalog.list().await?,
    };
    debug!(count = goods.len(), "goods command");
    print_json(&goods)
}

/// Looks a good up by its scanned product id.
pub async fn scan(args: ScanArgs, ctx: &Context) -> CliResult<()> {
    let good = Catalog::new(&ctx.db)
        .find_by_product_id(&args.product_id)
        .await?;
    print_json(&good)
}

pub async fn low_stock(args: LowStockArgs, ctx: &Context) -> CliResult<()> {
    let threshold = args.threshold.unwrap_or(ctx.config.low_stock_threshold);
    let goods = Catalog::new(&ctx.db).low_stock(threshold).await?;
    print_json(&goods)
}
