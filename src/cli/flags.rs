//! `dropdeck flags`: show the dropdown source switch

use crate::api::feature_flags::DropdownSystemFlags;
use crate::server::config::AppConfig;
use crate::server::source_selection;
use anyhow::Result;

pub fn run(config: &AppConfig) -> Result<()> {
    let selection = source_selection(config);
    let ttl = (config.cache.ttl_secs > 0).then_some(config.cache.ttl_secs);
    let flags = DropdownSystemFlags::from_selection(&selection, ttl);
    println!("{}", serde_json::to_string_pretty(&flags)?);
    Ok(())
}
