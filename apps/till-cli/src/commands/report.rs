//! # Report Commands
//!
//! `sales` prints the per-day history, `metrics` the summary snapshot.

use chrono::NaiveDate;
use till_db::ReportService;

use super::{print_json, Context, ReportArgs};
use crate::error::{CliError, CliResult};

pub async fn sales(args: ReportArgs, ctx: &Context) -> CliResult<()> {
    let date = parse_date(args.date.as_deref())?;
    let reports = ReportService::new(&ctx.db, ctx.config.reporting_zone());
    let history = reports.history(args.salesperson.as_deref(), date).await?;
    print_json(&history)
}

pub async fn metrics(args: ReportArgs, ctx: &Context) -> CliResult<()> {
    let date = parse_date(args.date.as_deref())?;
    let reports = ReportService::new(&ctx.db, ctx.config.reporting_zone());
    let snapshot = reports.metrics(args.salesperson.as_deref(), date).await;
    print_json(&snapshot)
}

fn parse_date(raw: Option<&str>) -> CliResult<Option<NaiveDate>> {
    raw.map(|d| {
        NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d")
            .map_err(|_| CliError::validation(format!("Invalid date '{d}', expected YYYY-MM-DD")))
    })
    .transpose()
}
