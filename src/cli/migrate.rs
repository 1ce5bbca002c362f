//! `dropdeck migrate`: normalized tables to `dropdown_configs`

use crate::server::config::AppConfig;
use crate::server::connect_store;
use anyhow::{Context, Result};
use dropdeck_core::DropdownMigrator;
use std::sync::Arc;
use tracing::info;

pub async fn run(config: &AppConfig, screen: Option<&str>, dry_run: bool) -> Result<()> {
    let store = connect_store(config).await?;
    if !dry_run {
        store
            .ensure_migration_target()
            .await
            .context("Failed to prepare dropdown_configs")?;
    }

    let report = DropdownMigrator::new(Arc::new(store))
        .dry_run(dry_run)
        .run(screen)
        .await
        .context("Dropdown migration failed")?;

    if report.dry_run {
        info!("Dry run: nothing was written");
    }
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
