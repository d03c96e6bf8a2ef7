//! `gcm config` – show config path and effective values.

use anyhow::Result;
use gcm_core::config::{self, GcmConfig};

pub fn run_config(cfg: &GcmConfig) -> Result<()> {
    println!("config: {}", config::config_path()?.display());
    let mut shown = cfg.clone();
    if shown.api_key.is_some() {
        shown.api_key = Some("<set>".to_string());
    }
    print!("{}", toml::to_string_pretty(&shown)?);
    Ok(())
}
