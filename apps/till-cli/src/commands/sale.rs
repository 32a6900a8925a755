//! # Sell Command
//!
//! Builds a cart from `--item` arguments and commits it.
//!
//! ```text
//! till sell -s amy -i RICE-5KG:2 -i MILK-1L -p 50
//!    │
//!    ├── maintenance flag on?  → refuse (MAINTENANCE)
//!    ├── scan each item, Cart::add
//!    ├── TransactionCommitter::commit
//!    └── print the receipt payload as JSON
//! ```

use tracing::{info, warn};
use till_core::{Cart, MAX_ITEM_QUANTITY};
use till_db::{Catalog, TransactionCommitter};

use super::{print_json, Context, SellArgs};
use crate::error::{CliError, CliResult, ErrorCode};

pub async fn sell(args: SellArgs, ctx: &Context) -> CliResult<()> {
    if ctx.db.settings().maintenance_mode().await? {
        warn!("Sale refused, maintenance mode is on");
        return Err(CliError::new(
            ErrorCode::Maintenance,
            "Sales are paused for maintenance",
        ));
    }

    let amount_paid_cents = parse_amount(&args.paid)?;

    let catalog = Catalog::new(&ctx.db);
    let mut cart = Cart::new();
    for raw in &args.items {
        let (product_id, quantity) = parse_item(raw)?;
        let good = catalog.find_by_product_id(product_id).await?;
        cart.add(&good, quantity)?;
    }

    info!(
        salesperson = %args.salesperson,
        lines = cart.len(),
        total = %cart.total(),
        "Committing sale"
    );

    let committer = TransactionCommitter::new(ctx.db.clone(), ctx.config.committer_config());
    let done = committer
        .commit(&mut cart, &args.salesperson, amount_paid_cents)
        .await?;

    print_json(&done.receipt(&ctx.config.store_info()))
}

/// Splits `PRODUCT_ID[:QTY]`. A missing quantity means one unit.
fn parse_item(raw: &str) -> CliResult<(&str, i64)> {
    let (code, quantity) = match raw.rsplit_once(':') {
        Some((code, qty)) => {
            let qty = qty.trim().parse::<i64>().map_err(|_| {
                CliError::validation(format!("Invalid quantity in '{raw}'"))
            })?;
            (code.trim(), qty)
        }
        None => (raw.trim(), 1),
    };

    if code.is_empty() {
        return Err(CliError::validation(format!("Missing product id in '{raw}'")));
    }
    if quantity > MAX_ITEM_QUANTITY {
        return Err(CliError::validation(format!(
            "Quantity {quantity} exceeds maximum allowed ({MAX_ITEM_QUANTITY})"
        )));
    }
    Ok((code, quantity))
}

/// Parses `50`, `49.9` or `49.95` into cents.
fn parse_amount(raw: &str) -> CliResult<i64> {
    let invalid = || CliError::new(ErrorCode::PaymentError, format!("Invalid amount '{raw}'"));

    let raw = raw.trim();
    let (negative, digits) = match raw.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, raw),
    };

    let (major, minor) = match digits.split_once('.') {
        Some((major, minor)) => (major, minor),
        None => (digits, ""),
    };

    if !major.starts_with(|c: char| c.is_ascii_digit())
        || minor.len() > 2
        || !minor.chars().all(|c| c.is_ascii_digit())
    {
        return Err(invalid());
    }

    let major: i64 = major.parse().map_err(|_| invalid())?;
    let minor: i64 = match minor.len() {
        0 => 0,
        1 => minor.parse::<i64>().map_err(|_| invalid())? * 10,
        _ => minor.parse().map_err(|_| invalid())?,
    };

    let cents = major
        .checked_mul(100)
        .and_then(|c| c.checked_add(minor))
        .ok_or_else(invalid)?;
    Ok(if negative { -cents } else { cents })
}
