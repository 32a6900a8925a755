//! # Maintenance Command

use serde_json::json;

use super::{print_json, Context, MaintenanceAction, MaintenanceArgs};
use crate::error::CliResult;

pub async fn maintenance(args: MaintenanceArgs, ctx: &Context) -> CliResult<()> {
    let settings = ctx.db.settings();
    match args.action {
        MaintenanceAction::On => settings.set_maintenance_mode(true).await?,
        MaintenanceAction::Off => settings.set_maintenance_mode(false).await?,
        MaintenanceAction::Status => {}
    }

    let active = settings.maintenance_mode().await?;
    print_json(&json!({ "maintenanceMode": active }))
}
